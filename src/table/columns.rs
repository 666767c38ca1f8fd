//! Column descriptors for the vertex table.
//!
//! A descriptor tells the rendering collaborator how to extract, format,
//! search and sort one cell. Descriptors are independent of the load cycle;
//! the status descriptor is the one exception, holding a live subscription to
//! a running row's progress so its percentage recomputes on every overlay
//! write without a new fetch.

use std::sync::{Arc, RwLock};

use crate::{
    ShareLock, VertexStatus,
    common::Subscription,
    config::ColumnsConfig,
    table::VertexRow,
    utils::{number, time},
};

pub type CellContentFn = Arc<dyn Fn(&Arc<VertexRow>) -> CellContent + Send + Sync>;
pub type SearchValueFn = Arc<dyn Fn(&Arc<VertexRow>) -> String + Send + Sync>;

/// Structured-cell renderer tags understood by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTemplate {
    LinkedCell,
    StatusCell,
    ConfigurationsCell,
}

/// Value a descriptor produces for one cell.
#[derive(Clone)]
pub enum CellContent {
    Empty,
    Text(String),
    Number(i64),
    Link {
        link_to: String,
        entity_id: String,
        display_text: String,
    },
    Status(Arc<StatusCell>),
    Configurations {
        link_to_additionals: bool,
        input_id: Option<String>,
        output_id: Option<String>,
        vertex_id: String,
    },
}

/// Describes one displayed column.
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// unique column id
    pub id: String,
    /// header label
    pub header: String,
    /// renderer tag for structured cells
    pub template: Option<CellTemplate>,
    /// accessor path into a vertex
    pub content_path: String,
    /// derived cell value; falls back to the content path when absent
    pub get_cell_content: Option<CellContentFn>,
    /// plain string for search/sort when the cell is structured
    pub get_search_value: Option<SearchValueFn>,
    pub search_and_sortable: bool,
}

impl ColumnDescriptor {
    fn new(
        id: &str,
        header: &str,
        content_path: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            header: header.to_string(),
            template: None,
            content_path: content_path.to_string(),
            get_cell_content: None,
            get_search_value: None,
            search_and_sortable: true,
        }
    }

    /// Cell value for one row: the derived content when the descriptor has
    /// one, otherwise the field named by the content path.
    pub fn cell_content(
        &self,
        row: &Arc<VertexRow>,
    ) -> CellContent {
        match &self.get_cell_content {
            Some(get) => (get)(row),
            None => extract(row, &self.content_path),
        }
    }

    /// String the table machinery searches and sorts on, when enabled.
    pub fn search_value(
        &self,
        row: &Arc<VertexRow>,
    ) -> Option<String> {
        if !self.search_and_sortable {
            return None;
        }
        if let Some(get) = &self.get_search_value {
            return Some((get)(row));
        }
        match self.cell_content(row) {
            CellContent::Text(text) => Some(text),
            CellContent::Number(n) => Some(n.to_string()),
            _ => Some(String::new()),
        }
    }
}

/// Field access by content path.
fn extract(
    row: &Arc<VertexRow>,
    content_path: &str,
) -> CellContent {
    match content_path {
        "name" => CellContent::Text(row.name.clone()),
        "id" => CellContent::Text(row.id.clone()),
        "status" => CellContent::Text(row.status().as_ref().to_string()),
        "start_time" => CellContent::Number(row.start_time),
        "end_time" => CellContent::Number(row.end_time),
        "duration" => CellContent::Number(row.duration),
        "first_task_start_time" => CellContent::Number(row.first_task_start_time),
        "num_tasks" => CellContent::Number(row.num_tasks),
        "processor_class_name" => CellContent::Text(row.processor_class_name.clone()),
        _ => CellContent::Empty,
    }
}

/// Derived view behind the status cell.
///
/// While the row is RUNNING the cell subscribes to the row's progress; each
/// overlay write reformats the displayed percentage. Rows in any other
/// status get no subscription, so late progress writes cannot touch them.
pub struct StatusCell {
    row: Arc<VertexRow>,
    pub status: VertexStatus,
    pub status_icon: String,
    progress_text: ShareLock<Option<String>>,
    _progress_subscription: Option<Subscription>,
}

impl StatusCell {
    pub fn new(row: &Arc<VertexRow>) -> Arc<Self> {
        let status = row.status();
        let progress_text = Arc::new(RwLock::new(row.progress.get().map(number::fraction_to_percentage)));

        let subscription = match status {
            VertexStatus::Running => {
                let slot = progress_text.clone();
                Some(row.progress.subscribe(move |progress| {
                    *slot.write().unwrap() = Some(number::fraction_to_percentage(*progress));
                }))
            }
            _ => None,
        };

        Arc::new(Self {
            row: row.clone(),
            status,
            status_icon: status_icon(status, row.has_failed_task_attempts),
            progress_text,
            _progress_subscription: subscription,
        })
    }

    pub fn row(&self) -> &Arc<VertexRow> {
        &self.row
    }

    /// Formatted percentage, absent until the first overlay write lands.
    pub fn progress_text(&self) -> Option<String> {
        self.progress_text.read().unwrap().clone()
    }
}

/// Icon class for a status, marked when the vertex saw failed task attempts.
fn status_icon(
    status: VertexStatus,
    has_failed_task_attempts: bool,
) -> String {
    let base = match status {
        VertexStatus::New | VertexStatus::Inited => "pending",
        VertexStatus::Running => "running",
        VertexStatus::Succeeded => "success",
        VertexStatus::Failed => "failed",
        VertexStatus::Killed => "killed",
        VertexStatus::Error => "error",
    };
    if has_failed_task_attempts {
        format!("{base} warning")
    } else {
        base.to_string()
    }
}

/// The full descriptor list for the vertex table.
///
/// The fixed base set is recomputed whenever the identity key changes; the
/// counter-derived suffix is generated once from configuration at
/// construction and reused across identity changes.
pub struct ColumnDescriptorRegistry {
    counter_columns: Vec<ColumnDescriptor>,
    base_key: ShareLock<Option<String>>,
    base: ShareLock<Vec<ColumnDescriptor>>,
}

impl ColumnDescriptorRegistry {
    pub fn new(config: &ColumnsConfig) -> Self {
        Self {
            counter_columns: counter_descriptors(config),
            base_key: Arc::new(RwLock::new(None)),
            base: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Base descriptors followed by the counter-derived suffix.
    pub fn descriptors(
        &self,
        identity_key: &str,
    ) -> Vec<ColumnDescriptor> {
        {
            let mut base_key = self.base_key.write().unwrap();
            if base_key.as_deref() != Some(identity_key) {
                *self.base.write().unwrap() = base_descriptors();
                *base_key = Some(identity_key.to_string());
            }
        }

        let mut descriptors = self.base.read().unwrap().clone();
        descriptors.extend(self.counter_columns.iter().cloned());
        descriptors
    }
}

/// The fixed base descriptor set, in display order.
fn base_descriptors() -> Vec<ColumnDescriptor> {
    let mut columns = Vec::new();

    let mut vertex_name = ColumnDescriptor::new("vertex_name", "Vertex Name", "name");
    vertex_name.template = Some(CellTemplate::LinkedCell);
    vertex_name.get_cell_content = Some(Arc::new(|row| CellContent::Link {
        link_to: "vertex".to_string(),
        entity_id: row.id.clone(),
        display_text: row.name.clone(),
    }));
    vertex_name.get_search_value = Some(Arc::new(|row| row.name.clone()));
    columns.push(vertex_name);

    columns.push(ColumnDescriptor::new("id", "Vertex ID", "id"));

    let mut status = ColumnDescriptor::new("status", "Status", "status");
    status.template = Some(CellTemplate::StatusCell);
    status.get_cell_content = Some(Arc::new(|row| CellContent::Status(StatusCell::new(row))));
    status.get_search_value = Some(Arc::new(|row| row.status().as_ref().to_string()));
    columns.push(status);

    let mut start_time = ColumnDescriptor::new("start_time", "Start Time", "start_time");
    start_time.get_cell_content = Some(Arc::new(|row| CellContent::Text(time::date_format(row.start_time))));
    start_time.get_search_value = Some(Arc::new(|row| time::date_format(row.start_time)));
    columns.push(start_time);

    let mut end_time = ColumnDescriptor::new("end_time", "End Time", "end_time");
    end_time.get_cell_content = Some(Arc::new(|row| CellContent::Text(time::date_format(row.end_time))));
    end_time.get_search_value = Some(Arc::new(|row| time::date_format(row.end_time)));
    columns.push(end_time);

    let mut duration = ColumnDescriptor::new("duration", "Duration", "duration");
    duration.get_cell_content = Some(Arc::new(|row| CellContent::Text(time::timing_format(row.duration))));
    duration.get_search_value = Some(Arc::new(|row| time::timing_format(row.duration)));
    columns.push(duration);

    let mut first_task_start_time = ColumnDescriptor::new("first_task_start_time", "First Task Start Time", "first_task_start_time");
    first_task_start_time.get_cell_content = Some(Arc::new(|row| CellContent::Text(time::date_format(row.first_task_start_time))));
    first_task_start_time.get_search_value = Some(Arc::new(|row| time::date_format(row.first_task_start_time)));
    columns.push(first_task_start_time);

    columns.push(ColumnDescriptor::new("tasks", "Tasks", "num_tasks"));
    columns.push(ColumnDescriptor::new("processor_class", "Processor Class", "processor_class_name"));

    let mut configurations = ColumnDescriptor::new("configurations", "Source/Sink Configs", "");
    configurations.template = Some(CellTemplate::ConfigurationsCell);
    configurations.search_and_sortable = false;
    configurations.get_cell_content = Some(Arc::new(|row| {
        let first_input_id = row.inputs.first().map(|io| io.id.clone());
        let first_output_id = row.outputs.first().map(|io| io.id.clone());
        CellContent::Configurations {
            link_to_additionals: row.inputs.len() > 1 || row.outputs.len() > 1 || (first_input_id.is_some() && first_output_id.is_some()),
            input_id: first_input_id,
            output_id: first_output_id,
            vertex_id: row.id.clone(),
        }
    }));
    columns.push(configurations);

    columns
}

/// Counter-derived descriptors, in order: defaults, then entity-specific,
/// then shared columns.
fn counter_descriptors(config: &ColumnsConfig) -> Vec<ColumnDescriptor> {
    let entity_counters = config.entity.get("vertex").cloned().unwrap_or_default();

    config
        .default_counters
        .iter()
        .chain(entity_counters.iter())
        .chain(config.shared_columns.iter())
        .map(|counter| {
            let id = format!("{}/{}", counter.group_name, counter.counter_name);
            let header = counter.header.clone().unwrap_or_else(|| counter.counter_name.clone());
            let mut descriptor = ColumnDescriptor::new(&id, &header, &format!("counters.{id}"));

            let lookup = counter.clone();
            descriptor.get_cell_content = Some(Arc::new(move |row| match row.counter(&lookup.group_name, &lookup.counter_name) {
                Some(value) => CellContent::Number(value),
                None => CellContent::Empty,
            }));
            descriptor
        })
        .collect()
}
