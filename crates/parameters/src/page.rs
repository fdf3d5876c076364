//! View-model for the Parameters page.
//!
//! [`ParametersPage`] owns everything the page shows: the active tab, the
//! fetched datasets, search and filter inputs, the add/edit form, the pending
//! delete confirmation, the cost calculator, and the status line. Remote work
//! goes through a [`ParametersBackend`]; after every successful write the
//! affected list is fetched again so the page always reflects the server.

use std::time::{Duration, Instant};

use previx_client::api::ApiError;
use previx_client::backend::ParametersBackend;
use previx_core::calculator::{calculate_from_form, CalculationResult};
use previx_core::cascade::CostSelection;
use previx_core::construction_cost::{BuildingCategory, ConstructionCost, ConstructionCostInput};
use previx_core::debounce::{Debounced, SEARCH_DEBOUNCE};
use previx_core::error::CoreError;
use previx_core::filter::{cost_categories, wear_categories, CostFilter, WearFilter};
use previx_core::grouping::{group_wear_coefficients, WearGroups};
use previx_core::types::{Dataset, DbId};
use previx_core::wear::{
    find_range_issues, lookup_coefficient, BucketKey, MaintenanceState, RangeIssue,
    WearCoefficient, WearCoefficientInput,
};

use crate::edit::{EditForm, EditSession, EditTarget};
use crate::error::PageError;
use crate::messages::{
    remote_error, success_text, Action, StatusMessage, CALCULATION_DONE, OPERATION_IN_PROGRESS,
};
use crate::store::{DataStore, FetchTicket, Memo};

/// Inputs of the cost calculator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationForm {
    /// Surface in m², as typed.
    pub surface: String,
    pub selection: CostSelection,
}

/// A remote write, resolved from the form or the delete confirmation.
enum WriteOp {
    CreateWear(WearCoefficientInput),
    UpdateWear(DbId, WearCoefficientInput),
    DeleteWear(DbId),
    CreateCost(ConstructionCostInput),
    UpdateCost(DbId, ConstructionCostInput),
    DeleteCost(DbId),
}

impl WriteOp {
    fn dataset(&self) -> Dataset {
        match self {
            Self::CreateWear(_) | Self::UpdateWear(..) | Self::DeleteWear(_) => {
                Dataset::WearCoefficients
            }
            Self::CreateCost(_) | Self::UpdateCost(..) | Self::DeleteCost(_) => {
                Dataset::ConstructionCosts
            }
        }
    }

    fn action(&self) -> Action {
        match self {
            Self::CreateWear(_) | Self::CreateCost(_) => Action::Create,
            Self::UpdateWear(..) | Self::UpdateCost(..) => Action::Update,
            Self::DeleteWear(_) | Self::DeleteCost(_) => Action::Delete,
        }
    }
}

/// Marks the page busy for as long as it lives, including when the write
/// future holding it is dropped before completing.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn start(busy: &'a mut bool) -> Self {
        *busy = true;
        Self(busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[derive(Debug)]
pub struct ParametersPage {
    active: Dataset,
    store: DataStore,

    wear_search: Debounced<String>,
    cost_search: Debounced<String>,
    wear_category: Option<String>,
    wear_state: Option<MaintenanceState>,
    cost_category: Option<BuildingCategory>,

    edit: Option<EditSession>,
    pending_delete: Option<DbId>,
    busy: bool,
    loading: bool,
    status: Option<StatusMessage>,

    calc: CalculationForm,
    result: Option<CalculationResult>,

    wear_view: Memo<(u64, WearFilter), Vec<WearCoefficient>>,
    wear_grouped: Memo<(u64, WearFilter, Option<BucketKey>), WearGroups>,
    cost_view: Memo<(u64, CostFilter), Vec<ConstructionCost>>,
}

impl Default for ParametersPage {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl ParametersPage {
    /// Page on the wear-coefficient tab, with `debounce` as the search quiet
    /// period.
    pub fn new(debounce: Duration) -> Self {
        Self {
            active: Dataset::WearCoefficients,
            store: DataStore::default(),
            wear_search: Debounced::new(debounce),
            cost_search: Debounced::new(debounce),
            wear_category: None,
            wear_state: None,
            cost_category: None,
            edit: None,
            pending_delete: None,
            busy: false,
            loading: false,
            status: None,
            calc: CalculationForm::default(),
            result: None,
            wear_view: Memo::default(),
            wear_grouped: Memo::default(),
            cost_view: Memo::default(),
        }
    }

    // ------------------------------------------------------------------
    // Tabs
    // ------------------------------------------------------------------

    pub fn active_tab(&self) -> Dataset {
        self.active
    }

    /// Make `dataset` the active tab. Switching resets searches, filters,
    /// the edit form, any pending delete, the calculator and the status line.
    /// Returns `false` if the tab was already active.
    pub fn switch_tab(&mut self, dataset: Dataset) -> bool {
        if self.active == dataset {
            return false;
        }
        tracing::debug!(tab = dataset.label(), "Switching parameters tab");
        self.active = dataset;
        self.reset_view_state();
        true
    }

    /// Switch to `dataset` and fetch its rows.
    pub async fn open_tab(
        &mut self,
        dataset: Dataset,
        backend: &dyn ParametersBackend,
    ) -> Result<(), PageError> {
        self.switch_tab(dataset);
        self.refresh_dataset(dataset, backend).await
    }

    fn reset_view_state(&mut self) {
        self.wear_search.reset();
        self.cost_search.reset();
        self.wear_category = None;
        self.wear_state = None;
        self.cost_category = None;
        self.edit = None;
        self.pending_delete = None;
        self.calc = CalculationForm::default();
        self.result = None;
        self.status = None;
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn wear_rows(&self) -> &[WearCoefficient] {
        self.store.wear()
    }

    pub fn cost_rows(&self) -> &[ConstructionCost] {
        self.store.costs()
    }

    /// Fetch the active tab's rows.
    pub async fn refresh(&mut self, backend: &dyn ParametersBackend) -> Result<(), PageError> {
        self.refresh_dataset(self.active, backend).await
    }

    /// Fetch both datasets, reporting the first failure.
    pub async fn load_all(&mut self, backend: &dyn ParametersBackend) -> Result<(), PageError> {
        let wear = self.refresh_dataset(Dataset::WearCoefficients, backend).await;
        let costs = self.refresh_dataset(Dataset::ConstructionCosts, backend).await;
        wear.and(costs)
    }

    /// Fetch `dataset`. On failure the previous rows stay in place and the
    /// error is shown in the status line.
    pub async fn refresh_dataset(
        &mut self,
        dataset: Dataset,
        backend: &dyn ParametersBackend,
    ) -> Result<(), PageError> {
        let ticket = self.begin_fetch(dataset);
        match dataset {
            Dataset::WearCoefficients => {
                let response = backend.list_wear_coefficients().await;
                self.apply_wear_response(ticket, response)
            }
            Dataset::ConstructionCosts => {
                let response = backend.list_construction_costs().await;
                self.apply_cost_response(ticket, response)
            }
        }
    }

    /// Register a fetch for `dataset`. Callers that run the request
    /// themselves hand the response back through `apply_*_response`.
    pub fn begin_fetch(&mut self, dataset: Dataset) -> FetchTicket {
        self.loading = true;
        self.store.begin_fetch(dataset)
    }

    /// Apply a wear-coefficient list response. A superseded response is
    /// dropped without touching the rows or the status line.
    pub fn apply_wear_response(
        &mut self,
        ticket: FetchTicket,
        response: Result<Vec<WearCoefficient>, ApiError>,
    ) -> Result<(), PageError> {
        let current = self.store.is_current(ticket);
        if current {
            self.loading = false;
        }
        match response {
            Ok(rows) => {
                let count = rows.len();
                if self.store.apply_wear(ticket, rows) {
                    tracing::info!(count, "Loaded wear coefficients");
                }
                Ok(())
            }
            Err(e) => Err(self.load_failed(ticket.dataset, current, e)),
        }
    }

    /// Apply a construction-cost list response. Same contract as
    /// [`Self::apply_wear_response`].
    pub fn apply_cost_response(
        &mut self,
        ticket: FetchTicket,
        response: Result<Vec<ConstructionCost>, ApiError>,
    ) -> Result<(), PageError> {
        let current = self.store.is_current(ticket);
        if current {
            self.loading = false;
        }
        match response {
            Ok(rows) => {
                let count = rows.len();
                if self.store.apply_costs(ticket, rows) {
                    tracing::info!(count, "Loaded construction costs");
                }
                Ok(())
            }
            Err(e) => Err(self.load_failed(ticket.dataset, current, e)),
        }
    }

    fn load_failed(&mut self, dataset: Dataset, current: bool, error: ApiError) -> PageError {
        tracing::error!(tab = dataset.label(), error = %error, "Failed to load parameters");
        if current {
            self.status = Some(remote_error(dataset, Action::Load, &error));
        }
        error.into()
    }

    // ------------------------------------------------------------------
    // Search and filters
    // ------------------------------------------------------------------

    pub fn wear_search(&self) -> &Debounced<String> {
        &self.wear_search
    }

    pub fn cost_search(&self) -> &Debounced<String> {
        &self.cost_search
    }

    /// Record a keystroke in the wear search box.
    pub fn set_wear_search(&mut self, text: impl Into<String>, now: Instant) {
        self.wear_search.set(text.into(), now);
    }

    /// Record a keystroke in the cost search box.
    pub fn set_cost_search(&mut self, text: impl Into<String>, now: Instant) {
        self.cost_search.set(text.into(), now);
    }

    /// Settle searches whose quiet period has elapsed. Returns `true` if a
    /// filtered view changed input.
    pub fn tick(&mut self, now: Instant) -> bool {
        let wear = self.wear_search.poll(now);
        let cost = self.cost_search.poll(now);
        if wear || cost {
            tracing::debug!(
                wear = %self.wear_search.settled(),
                cost = %self.cost_search.settled(),
                "Search settled"
            );
        }
        wear || cost
    }

    /// Settle both searches immediately.
    pub fn flush_searches(&mut self) -> bool {
        let wear = self.wear_search.flush();
        let cost = self.cost_search.flush();
        wear || cost
    }

    /// Earliest instant at which [`Self::tick`] has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.wear_search.deadline(), self.cost_search.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn set_wear_category_filter(&mut self, category: Option<String>) {
        self.wear_category = category.filter(|c| !c.trim().is_empty());
    }

    pub fn set_wear_state_filter(&mut self, state: Option<MaintenanceState>) {
        self.wear_state = state;
    }

    pub fn set_cost_category_filter(&mut self, category: Option<BuildingCategory>) {
        self.cost_category = category;
    }

    /// Filter currently applied to the wear list (settled search only).
    pub fn wear_filter(&self) -> WearFilter {
        WearFilter {
            category: self.wear_category.clone(),
            state: self.wear_state,
            search: self.wear_search.settled().clone(),
        }
    }

    /// Filter currently applied to the cost list (settled search only).
    pub fn cost_filter(&self) -> CostFilter {
        CostFilter {
            category: self.cost_category,
            search: self.cost_search.settled().clone(),
        }
    }

    /// Category filter options for the wear tab.
    pub fn wear_categories(&self) -> Vec<String> {
        wear_categories(self.store.wear())
    }

    /// Category filter options for the cost tab.
    pub fn cost_categories(&self) -> Vec<BuildingCategory> {
        cost_categories(self.store.costs())
    }

    pub fn filtered_wear(&mut self) -> &[WearCoefficient] {
        let filter = self.wear_filter();
        let rows = self.store.wear();
        self.wear_view
            .get_or_compute((self.store.revision(), filter.clone()), || filter.apply(rows))
    }

    pub fn filtered_costs(&mut self) -> &[ConstructionCost] {
        let filter = self.cost_filter();
        let rows = self.store.costs();
        self.cost_view
            .get_or_compute((self.store.revision(), filter.clone()), || filter.apply(rows))
    }

    /// Filtered wear rows grouped for display. The bucket receiving a new row
    /// stays visible even while empty.
    pub fn wear_groups(&mut self) -> &WearGroups {
        let filter = self.wear_filter();
        let adding = self.edit.as_ref().and_then(EditSession::adding_into).cloned();
        let revision = self.store.revision();
        let rows = self.store.wear();

        let filtered = self
            .wear_view
            .get_or_compute((revision, filter.clone()), || filter.apply(rows));
        self.wear_grouped
            .get_or_compute((revision, filter.clone(), adding.clone()), || {
                group_wear_coefficients(filtered, adding.as_ref())
            })
    }

    /// Coefficient row applicable to an asset of `age` years, over all
    /// fetched rows regardless of filters.
    pub fn coefficient_for(&self, key: &BucketKey, age: i32) -> Option<&WearCoefficient> {
        lookup_coefficient(self.store.wear(), key, age)
    }

    /// Overlaps and gaps between the age ranges of one bucket.
    pub fn range_issues(&self, key: &BucketKey) -> Vec<RangeIssue> {
        let bucket: Vec<WearCoefficient> = self
            .store
            .wear()
            .iter()
            .filter(|row| key.contains(row))
            .cloned()
            .collect();
        find_range_issues(&bucket)
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether add, edit and delete actions are enabled.
    pub fn can_modify(&self) -> bool {
        !self.busy
    }

    fn ensure_idle(&mut self) -> Result<(), PageError> {
        if self.busy {
            self.status = Some(StatusMessage::error(OPERATION_IN_PROGRESS));
            return Err(PageError::Busy);
        }
        Ok(())
    }

    fn ensure_tab(&self, dataset: Dataset) -> Result<(), PageError> {
        if self.active != dataset {
            return Err(PageError::Unavailable("onglet inactif"));
        }
        Ok(())
    }

    /// Show a local failure and hand it back as a [`PageError`].
    fn reject(&mut self, error: CoreError) -> PageError {
        self.status = Some(StatusMessage::error(error.user_message()));
        error.into()
    }

    // ------------------------------------------------------------------
    // Add / edit
    // ------------------------------------------------------------------

    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut EditForm> {
        self.edit.as_mut().map(|session| &mut session.form)
    }

    /// Open the add form for a wear coefficient.
    ///
    /// With a bucket, the form is prefilled for that category, subcategory
    /// and state, and `age_min` continues from the bucket's last range.
    /// Without one, the active filters seed category and state.
    pub fn start_add_wear(&mut self, bucket: Option<BucketKey>) -> Result<(), PageError> {
        self.ensure_tab(Dataset::WearCoefficients)?;
        self.ensure_idle()?;
        let form = match &bucket {
            Some(key) => {
                let rows: Vec<WearCoefficient> = self
                    .store
                    .wear()
                    .iter()
                    .filter(|row| key.contains(row))
                    .cloned()
                    .collect();
                WearCoefficientInput::for_bucket(key, &rows)
            }
            None => WearCoefficientInput {
                equipment_category: self.wear_category.clone().unwrap_or_default(),
                maintenance_state: self.wear_state.unwrap_or(MaintenanceState::Bon),
                ..WearCoefficientInput::default()
            },
        };
        self.open_edit(EditTarget::New, EditForm::Wear(form), bucket);
        Ok(())
    }

    /// Open the edit form for an existing wear coefficient.
    pub fn start_edit_wear(&mut self, id: DbId) -> Result<(), PageError> {
        self.ensure_tab(Dataset::WearCoefficients)?;
        self.ensure_idle()?;
        let Some(row) = self.store.wear().iter().find(|row| row.wear_id == id) else {
            return Err(self.reject(CoreError::NotFound {
                entity: "wear_coefficient",
                id,
            }));
        };
        let form = WearCoefficientInput::from(row);
        self.open_edit(EditTarget::Existing(id), EditForm::Wear(form), None);
        Ok(())
    }

    /// Open the add form for a construction cost, in the filtered category.
    pub fn start_add_cost(&mut self) -> Result<(), PageError> {
        self.ensure_tab(Dataset::ConstructionCosts)?;
        self.ensure_idle()?;
        let form = ConstructionCostInput::new(self.cost_category.unwrap_or_default());
        self.open_edit(EditTarget::New, EditForm::Cost(form), None);
        Ok(())
    }

    /// Open the edit form for an existing construction cost.
    pub fn start_edit_cost(&mut self, id: DbId) -> Result<(), PageError> {
        self.ensure_tab(Dataset::ConstructionCosts)?;
        self.ensure_idle()?;
        let Some(row) = self.store.costs().iter().find(|row| row.id == Some(id)) else {
            return Err(self.reject(CoreError::NotFound {
                entity: "construction_cost",
                id,
            }));
        };
        let form = ConstructionCostInput::from(row);
        self.open_edit(EditTarget::Existing(id), EditForm::Cost(form), None);
        Ok(())
    }

    fn open_edit(&mut self, target: EditTarget, form: EditForm, bucket: Option<BucketKey>) {
        self.pending_delete = None;
        self.status = None;
        self.edit = Some(EditSession {
            target,
            form,
            bucket,
        });
    }

    /// Close the form without saving.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Validate and submit the open form.
    ///
    /// Validation failures are reported locally and issue no request. On
    /// success the form closes and the list is fetched again; on a remote
    /// failure the form stays open with the server's message.
    pub async fn save_edit(&mut self, backend: &dyn ParametersBackend) -> Result<(), PageError> {
        self.ensure_idle()?;
        let Some(session) = self.edit.clone() else {
            return Err(PageError::Unavailable("aucun formulaire ouvert"));
        };

        let op = match (session.target, session.form) {
            (target, EditForm::Wear(input)) => {
                let input = input.validated().map_err(|e| self.reject(e))?;
                match target {
                    EditTarget::New => WriteOp::CreateWear(input),
                    EditTarget::Existing(id) => WriteOp::UpdateWear(id, input),
                }
            }
            (target, EditForm::Cost(input)) => {
                let input = input.validated().map_err(|e| self.reject(e))?;
                match target {
                    EditTarget::New => WriteOp::CreateCost(input),
                    EditTarget::Existing(id) => WriteOp::UpdateCost(id, input),
                }
            }
        };

        self.execute(backend, op).await?;
        self.edit = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    pub fn pending_delete(&self) -> Option<DbId> {
        self.pending_delete
    }

    /// Ask for confirmation before deleting row `id` of the active tab.
    pub fn request_delete(&mut self, id: DbId) -> Result<(), PageError> {
        self.ensure_idle()?;
        let exists = match self.active {
            Dataset::WearCoefficients => self.store.wear().iter().any(|r| r.wear_id == id),
            Dataset::ConstructionCosts => self.store.costs().iter().any(|r| r.id == Some(id)),
        };
        if !exists {
            let entity = match self.active {
                Dataset::WearCoefficients => "wear_coefficient",
                Dataset::ConstructionCosts => "construction_cost",
            };
            return Err(self.reject(CoreError::NotFound { entity, id }));
        }
        self.pending_delete = Some(id);
        Ok(())
    }

    /// Dismiss the confirmation; nothing is sent.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the row awaiting confirmation.
    pub async fn confirm_delete(
        &mut self,
        backend: &dyn ParametersBackend,
    ) -> Result<(), PageError> {
        self.ensure_idle()?;
        let Some(id) = self.pending_delete.take() else {
            return Err(PageError::Unavailable("aucune suppression à confirmer"));
        };
        let op = match self.active {
            Dataset::WearCoefficients => WriteOp::DeleteWear(id),
            Dataset::ConstructionCosts => WriteOp::DeleteCost(id),
        };
        self.execute(backend, op).await
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    async fn execute(
        &mut self,
        backend: &dyn ParametersBackend,
        op: WriteOp,
    ) -> Result<(), PageError> {
        let dataset = op.dataset();
        let action = op.action();

        let outcome = {
            let _in_flight = InFlight::start(&mut self.busy);
            match &op {
                WriteOp::CreateWear(input) => backend.create_wear_coefficient(input).await,
                WriteOp::UpdateWear(id, input) => backend.update_wear_coefficient(*id, input).await,
                WriteOp::DeleteWear(id) => backend.delete_wear_coefficient(*id).await,
                WriteOp::CreateCost(input) => backend.create_construction_cost(input).await,
                WriteOp::UpdateCost(id, input) => backend.update_construction_cost(*id, input).await,
                WriteOp::DeleteCost(id) => backend.delete_construction_cost(*id).await,
            }
        };

        match outcome {
            Ok(()) => {
                tracing::info!(tab = dataset.label(), action = ?action, "Parameters saved");
                self.status = Some(StatusMessage::success(success_text(dataset, action)));
                if let Err(e) = self.refresh_dataset(dataset, backend).await {
                    tracing::warn!(error = %e, "Reload after write failed");
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(tab = dataset.label(), action = ?action, error = %e, "Parameters write failed");
                self.status = Some(remote_error(dataset, action, &e));
                Err(e.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Calculator
    // ------------------------------------------------------------------

    pub fn calculation_form(&self) -> &CalculationForm {
        &self.calc
    }

    pub fn set_surface(&mut self, surface: impl Into<String>) {
        self.calc.surface = surface.into();
    }

    pub fn set_calc_category(&mut self, category: Option<BuildingCategory>) {
        self.calc.selection.set_category(category);
    }

    pub fn set_calc_type(&mut self, construction_type: Option<&str>) -> Result<(), PageError> {
        let rows = self.store.costs();
        match self.calc.selection.set_type(rows, construction_type) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.reject(e)),
        }
    }

    pub fn set_calc_structure(&mut self, structure: Option<&str>) -> Result<(), PageError> {
        let rows = self.store.costs();
        match self.calc.selection.set_structure(rows, structure) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.reject(e)),
        }
    }

    pub fn set_calc_envelope(&mut self, envelope: Option<&str>) -> Result<(), PageError> {
        let rows = self.store.costs();
        match self.calc.selection.set_envelope(rows, envelope) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.reject(e)),
        }
    }

    pub fn available_types(&self) -> Vec<String> {
        self.calc.selection.available_types(self.store.costs())
    }

    pub fn available_structures(&self) -> Vec<String> {
        self.calc.selection.available_structures(self.store.costs())
    }

    pub fn available_envelopes(&self) -> Vec<String> {
        self.calc.selection.available_envelopes(self.store.costs())
    }

    /// Cost row matching the current selection, looked up against the
    /// latest fetched rows.
    pub fn selected_cost(&self) -> Option<&ConstructionCost> {
        self.calc.selection.resolve(self.store.costs())
    }

    pub fn result(&self) -> Option<&CalculationResult> {
        self.result.as_ref()
    }

    /// Run the calculator. A success replaces the previous result; a
    /// validation failure leaves it untouched.
    pub fn calculate(&mut self) -> Result<&CalculationResult, PageError> {
        let selected = self.calc.selection.resolve(self.store.costs());
        match calculate_from_form(&self.calc.surface, selected) {
            Ok(result) => {
                tracing::debug!(surface = result.surface, "Construction cost calculated");
                self.status = Some(StatusMessage::success(CALCULATION_DONE));
                Ok(self.result.insert(result))
            }
            Err(e) => Err(self.reject(e)),
        }
    }
}
