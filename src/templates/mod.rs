mod data_source;
mod template;

pub use self::{
    data_source::{ClockSource, TemplateDataSource, FILE_STAMP_FORMAT, GENERATED_ON_FORMAT},
    template::Template,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[derive(Clone)]
    pub struct MockDataSource {
        data: HashMap<String, String>,
    }

    impl TemplateDataSource for MockDataSource {
        fn get_values(&self) -> HashMap<String, String> {
            self.data.clone()
        }

        fn clone_data_source(&self) -> Box<dyn TemplateDataSource> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_template_compile() {
        let mock_data_source = MockDataSource {
            data: HashMap::from([("datetime".to_string(), "2023-10-01T12:00:00".to_string())]),
        };

        let template = Template::new(
            "Current datetime is: {{datetime}}. User input: {{user_input}}.",
            mock_data_source,
        );

        let mut user_data = HashMap::new();
        user_data.insert("user_input".to_string(), "Hello, world!".to_string());

        assert_eq!(
            template.compile(&user_data),
            "Current datetime is: 2023-10-01T12:00:00. User input: Hello, world!."
        );
    }

    #[test]
    fn user_data_overrides_source() {
        let source = MockDataSource {
            data: HashMap::from([("who".to_string(), "source".to_string())]),
        };
        let template = Template::new("{{who}}", source);
        assert_eq!(template.render([("who", "user")]), "user");
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let template = Template::simple("Original:\n{{original}}\n\nSummary:\n{{summary}}");
        let out = template.render([("original", "see {{summary}}"), ("summary", "short")]);
        assert_eq!(out, "Original:\nsee {{summary}}\n\nSummary:\nshort");
    }

    #[test]
    fn unknown_and_unterminated_placeholders_are_kept() {
        let template = Template::simple("a {{missing}} b {{ open");
        assert_eq!(template.compile(&HashMap::new()), "a {{missing}} b {{ open");
    }

    #[test]
    fn placeholder_keys_are_trimmed() {
        let template = Template::simple("Hi {{ name }}!");
        assert_eq!(template.render([("name", "Ana")]), "Hi Ana!");
    }

    #[test]
    fn clock_source_formats_pinned_instant() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        let template = Template::new("{{generated_on}} / {{file_stamp}}", ClockSource::fixed(at));
        assert_eq!(template.compile(&HashMap::new()), "2025-03-09 14:05:07 / 20250309_140507");
    }
}
