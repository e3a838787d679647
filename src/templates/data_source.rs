use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};

/// Supplies ambient values for a [`Template`](super::Template).
pub trait TemplateDataSource: Send + Sync {
    fn get_values(&self) -> HashMap<String, String>;
    fn clone_data_source(&self) -> Box<dyn TemplateDataSource>;
}

pub const GENERATED_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Fills `{{generated_on}}` and `{{file_stamp}}` from the local clock,
/// or from a pinned instant.
#[derive(Debug, Clone, Default)]
pub struct ClockSource {
    pinned: Option<NaiveDateTime>,
}

impl ClockSource {
    pub fn now() -> Self {
        Self::default()
    }

    pub fn fixed(at: NaiveDateTime) -> Self {
        Self { pinned: Some(at) }
    }

    pub fn instant(&self) -> NaiveDateTime {
        self.pinned.unwrap_or_else(|| Local::now().naive_local())
    }
}

impl TemplateDataSource for ClockSource {
    fn get_values(&self) -> HashMap<String, String> {
        let at = self.instant();
        HashMap::from([
            ("generated_on".to_string(), at.format(GENERATED_ON_FORMAT).to_string()),
            ("file_stamp".to_string(), at.format(FILE_STAMP_FORMAT).to_string()),
        ])
    }

    fn clone_data_source(&self) -> Box<dyn TemplateDataSource> {
        Box::new(self.clone())
    }
}
