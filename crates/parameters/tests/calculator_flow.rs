//! Integration tests for the construction cost tab: cascading selection,
//! the calculator, and cost rows stored with legacy tier names.

mod common;

use assert_matches::assert_matches;

use previx_core::construction_cost::{BuildingCategory, Tier};
use previx_core::error::CoreError;
use previx_core::types::Dataset;
use previx_parameters::edit::EditForm;
use previx_parameters::error::PageError;
use previx_parameters::messages::{StatusKind, CALCULATION_DONE};
use previx_parameters::page::ParametersPage;

use common::{sample_costs, FakeBackend};

async fn cost_page(backend: &FakeBackend) -> ParametersPage {
    let mut page = ParametersPage::default();
    page.open_tab(Dataset::ConstructionCosts, backend).await.unwrap();
    backend.clear_calls();
    page
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ---------------------------------------------------------------------------
// Test: cascading selection
// ---------------------------------------------------------------------------

/// Choosing a type adopts the structure and envelope of its first row;
/// choosing a category clears everything below it.
#[tokio::test]
async fn selection_cascades_from_category() {
    let backend = FakeBackend::new(Vec::new(), sample_costs());
    let mut page = cost_page(&backend).await;

    page.set_calc_category(Some(BuildingCategory::Residential));
    assert_eq!(page.available_types(), vec!["Maison"]);

    page.set_calc_type(Some("Maison")).unwrap();
    let selection = &page.calculation_form().selection;
    assert_eq!(selection.structure.as_deref(), Some("Béton"));
    assert_eq!(selection.envelope.as_deref(), Some("Brique"));
    assert_eq!(page.available_structures(), vec!["Béton", "Bois"]);

    page.set_calc_structure(Some("Bois")).unwrap();
    assert_eq!(
        page.calculation_form().selection.envelope.as_deref(),
        Some("Bardage")
    );
    assert_eq!(page.selected_cost().and_then(|c| c.id), Some(11));

    page.set_calc_category(Some(BuildingCategory::Industrial));
    let selection = &page.calculation_form().selection;
    assert!(selection.construction_type.is_none());
    assert!(selection.structure.is_none());
    assert!(selection.envelope.is_none());
    assert!(page.selected_cost().is_none());
}

/// Values absent from the data are refused.
#[tokio::test]
async fn unknown_selection_is_refused() {
    let backend = FakeBackend::new(Vec::new(), sample_costs());
    let mut page = cost_page(&backend).await;

    page.set_calc_category(Some(BuildingCategory::Industrial));
    assert_matches!(
        page.set_calc_type(Some("Maison")),
        Err(PageError::Core(CoreError::Validation(_)))
    );
    assert!(page.calculation_form().selection.construction_type.is_none());
    let status = page.status().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains("Maison"));

    page.set_calc_type(Some("Entrepôt")).unwrap();
    assert_matches!(
        page.set_calc_structure(Some("Bois")),
        Err(PageError::Core(CoreError::Validation(_)))
    );
    assert!(page.status().unwrap().text.contains("Bois"));
    assert_matches!(
        page.set_calc_envelope(Some("Brique")),
        Err(PageError::Core(CoreError::Validation(_)))
    );
    assert!(page.status().unwrap().text.contains("Brique"));
}

// ---------------------------------------------------------------------------
// Test: calculator
// ---------------------------------------------------------------------------

/// 100 m² with tiers 500 / 700 / (700 × 1.2) and 40 of studies per m².
#[tokio::test]
async fn calculator_applies_ancillary_costs_and_luxe_fallback() {
    let backend = FakeBackend::new(Vec::new(), sample_costs());
    let mut page = cost_page(&backend).await;

    page.set_calc_category(Some(BuildingCategory::Residential));
    page.set_calc_type(Some("Maison")).unwrap();
    page.set_surface("100");

    let result = page.calculate().unwrap().clone();
    assert_close(result.surface, 100.0);
    assert_close(result.per_m2(Tier::Bon), 540.0);
    assert_close(result.per_m2(Tier::Haut), 740.0);
    assert_close(result.per_m2(Tier::Luxe), 880.0);
    assert_close(result.total(Tier::Bon), 54_000.0);
    assert_close(result.total(Tier::Haut), 74_000.0);
    assert_close(result.total(Tier::Luxe), 88_000.0);
    assert_close(result.details.studies, 40.0);
    assert_eq!(page.status().unwrap().text, CALCULATION_DONE);
    assert!(backend.calls().is_empty());
}

/// Rows stored with `cost_low` / `cost_standard` are priced like the others.
#[tokio::test]
async fn legacy_tier_names_are_priced() {
    let backend = FakeBackend::new(Vec::new(), sample_costs());
    let mut page = cost_page(&backend).await;

    page.set_calc_category(Some(BuildingCategory::Industrial));
    page.set_calc_type(Some("Entrepôt")).unwrap();
    page.set_surface("200,5");

    let result = page.calculate().unwrap();
    assert_close(result.per_m2(Tier::Bon), 315.5);
    assert_close(result.per_m2(Tier::Haut), 435.5);
    assert_close(result.per_m2(Tier::Luxe), 420.0 * 1.2 + 15.5);
    assert_close(result.total(Tier::Bon), 200.5 * 315.5);
}

/// An invalid surface or missing selection is reported and the previous
/// result stays on screen.
#[tokio::test]
async fn calculation_errors_keep_previous_result() {
    let backend = FakeBackend::new(Vec::new(), sample_costs());
    let mut page = cost_page(&backend).await;

    page.set_calc_category(Some(BuildingCategory::Residential));
    page.set_calc_type(Some("Maison")).unwrap();
    page.set_surface("100");
    page.calculate().unwrap();

    for surface in ["", "abc", "0", "-5"] {
        page.set_surface(surface);
        assert_matches!(
            page.calculate(),
            Err(PageError::Core(CoreError::Validation(_)))
        );
        assert_eq!(
            page.status().unwrap().text,
            "Veuillez saisir une surface valide (nombre positif)"
        );
    }

    page.set_surface("50");
    page.set_calc_category(None);
    assert!(page.calculate().is_err());
    assert!(page.status().unwrap().text.contains("sélectionner"));

    assert_close(page.result().unwrap().surface, 100.0);
}

/// The selected row is looked up again after every reload, so the
/// calculator uses the server's latest prices.
#[tokio::test]
async fn selection_follows_reloaded_rows() {
    let backend = FakeBackend::new(Vec::new(), sample_costs());
    let mut page = cost_page(&backend).await;

    page.set_calc_category(Some(BuildingCategory::Residential));
    page.set_calc_type(Some("Maison")).unwrap();
    page.set_surface("10");
    assert_close(page.calculate().unwrap().per_m2(Tier::Bon), 540.0);

    page.start_edit_cost(10).unwrap();
    if let Some(EditForm::Cost(input)) = page.edit_form_mut() {
        input.cost_bon = 600.0;
    }
    page.save_edit(&backend).await.unwrap();
    assert_eq!(backend.calls(), vec!["PUT costs/10", "GET costs"]);

    assert_close(page.selected_cost().unwrap().tiers.bon, 600.0);
    assert_close(page.calculate().unwrap().per_m2(Tier::Bon), 640.0);

    backend.set_cost_bon(10, 700.0);
    page.refresh(&backend).await.unwrap();
    assert_close(page.calculate().unwrap().per_m2(Tier::Bon), 740.0);
}

/// Editing a row without a stored luxe price keeps luxe derived from haut,
/// so raising haut raises luxe after the reload.
#[tokio::test]
async fn editing_haut_keeps_luxe_derived() {
    let backend = FakeBackend::new(Vec::new(), sample_costs());
    let mut page = cost_page(&backend).await;

    page.start_edit_cost(10).unwrap();
    match page.edit_form_mut() {
        Some(EditForm::Cost(input)) => {
            assert_eq!(input.cost_luxe, None);
            input.cost_haut = 1000.0;
        }
        other => panic!("expected a cost form, got {other:?}"),
    }
    page.save_edit(&backend).await.unwrap();

    let row = page.cost_rows().iter().find(|c| c.id == Some(10)).unwrap();
    assert_close(row.tiers.haut, 1000.0);
    assert_close(row.tiers.luxe, 1200.0);
    assert_eq!(row.stored_luxe, None);
}

/// Cost search matches type, structure, envelope and lots, case-insensitively.
#[tokio::test]
async fn cost_search_and_category_filter() {
    let backend = FakeBackend::new(Vec::new(), sample_costs());
    let mut page = cost_page(&backend).await;

    assert_eq!(
        page.cost_categories(),
        vec![BuildingCategory::Residential, BuildingCategory::Industrial]
    );

    page.set_cost_search("BOIS", std::time::Instant::now());
    page.flush_searches();
    let ids: Vec<_> = page.filtered_costs().iter().filter_map(|c| c.id).collect();
    assert_eq!(ids, vec![11]);

    page.set_cost_search("", std::time::Instant::now());
    page.flush_searches();
    page.set_cost_category_filter(Some(BuildingCategory::Industrial));
    let ids: Vec<_> = page.filtered_costs().iter().filter_map(|c| c.id).collect();
    assert_eq!(ids, vec![12]);
}
