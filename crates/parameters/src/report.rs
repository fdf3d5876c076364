//! Plain-text rendering of the page views for the command-line binary.

use std::fmt::Write;

use previx_core::calculator::CalculationResult;
use previx_core::construction_cost::{ConstructionCost, Tier};
use previx_core::grouping::WearGroups;
use previx_core::wear::{find_range_issues, RangeIssue};

/// Amount in euros with two decimals and spaced thousands, e.g. `54 000.00 €`.
pub fn format_eur(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part} €")
}

/// Category / subcategory / state tree with one line per age range.
pub fn render_wear_groups(groups: &WearGroups) -> String {
    let mut out = String::new();
    for category in &groups.categories {
        let _ = writeln!(out, "{}", category.category);
        for sub in &category.subcategories {
            let _ = writeln!(out, "  {}", sub.subcategory);
            for bucket in &sub.states {
                let _ = writeln!(out, "    {} ({})", bucket.state.label(), bucket.rows.len());
                for row in &bucket.rows {
                    let _ = writeln!(
                        out,
                        "      #{:<5} {:<10} x{:.2}",
                        row.wear_id,
                        row.age_range_label(),
                        row.coefficient
                    );
                }
                for issue in find_range_issues(&bucket.rows) {
                    let _ = writeln!(out, "      ! {}", describe_issue(&issue));
                }
            }
        }
    }
    if groups.categories.is_empty() {
        out.push_str("Aucun coefficient d'usure\n");
    }
    out
}

fn describe_issue(issue: &RangeIssue) -> String {
    match issue {
        RangeIssue::Overlap { first, second } => {
            format!("chevauchement entre #{first} et #{second}")
        }
        RangeIssue::Gap { from, to, .. } => format!("aucune plage pour {from}-{to} ans"),
    }
}

/// One line per cost row with its three tier prices.
pub fn render_costs(rows: &[ConstructionCost]) -> String {
    if rows.is_empty() {
        return "Aucun coût de construction\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let id = row.id.map(|id| format!("#{id}")).unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<6} [{}] {} / {} / {}  bon {}  haut {}  luxe {}",
            id,
            row.category.label(),
            row.construction_type,
            row.structure,
            row.envelope,
            format_eur(row.tiers.bon),
            format_eur(row.tiers.haut),
            format_eur(row.tiers.luxe),
        );
    }
    out
}

/// Per-m² and total cost per tier, followed by the ancillary breakdown.
pub fn render_result(result: &CalculationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Surface : {} m²", result.surface);
    for tier in Tier::ALL {
        let _ = writeln!(
            out,
            "{:<14} {} /m²  total {}",
            tier.label(),
            format_eur(result.per_m2(tier)),
            format_eur(result.total(tier)),
        );
    }
    let details = &result.details;
    let _ = writeln!(
        out,
        "Dont études {}  VRD {}  honoraires {}  divers {} (par m²)",
        format_eur(details.studies),
        format_eur(details.vrd),
        format_eur(details.fees),
        format_eur(details.miscellaneous),
    );
    out
}
