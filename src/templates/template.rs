use core::fmt;
use std::collections::HashMap;

use super::TemplateDataSource;

/// Prompt or report text with `{{key}}` placeholders.
pub struct Template {
    content: String,
    data_source: Option<Box<dyn TemplateDataSource>>,
}

impl Template {
    pub fn new<T, D>(content: T, data_source: D) -> Self
    where
        T: Into<String>,
        D: TemplateDataSource + 'static,
    {
        Self {
            content: content.into(),
            data_source: Some(Box::new(data_source)),
        }
    }

    pub fn simple<T>(content: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            content: content.into(),
            data_source: None,
        }
    }

    /// Substitute placeholders in one pass over the template.
    ///
    /// `data` wins over the data source. Substituted values are never
    /// rescanned, so user text containing `{{...}}` is inserted verbatim.
    /// Unknown placeholders are left as they are.
    pub fn compile(&self, data: &HashMap<String, String>) -> String {
        let mut values = match &self.data_source {
            Some(source) => source.get_values(),
            None => HashMap::new(),
        };
        for (key, value) in data {
            values.insert(key.clone(), value.clone());
        }

        let mut out = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };

            let key = after_open[..end].trim();
            match values.get(key) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after_open[end + 2..];
        }
        out.push_str(rest);
        out
    }

    /// Compile with borrowed key/value pairs.
    pub fn render<'a, I>(&self, pairs: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let data: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.compile(&data)
    }
}

impl Clone for Template {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            data_source: self.data_source.as_ref().map(|s| s.clone_data_source()),
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("content", &self.content)
            .field(
                "data_source",
                &self
                    .data_source
                    .as_ref()
                    .map(|_| "Some(Box<dyn TemplateDataSource>)")
                    .unwrap_or("None"),
            )
            .finish()
    }
}
