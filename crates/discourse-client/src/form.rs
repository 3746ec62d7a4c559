//! Multipart form bodies.

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    /// Field name.
    pub name: String,
    /// Field content.
    pub value: FormValue,
}

/// Content of a multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Plain text field.
    Text(String),
    /// File field.
    File {
        /// File contents.
        bytes: Vec<u8>,
        /// Filename reported to the server.
        filename: Option<String>,
    },
}

/// A multipart/form-data body, kept as plain data until the transport
/// encodes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Append a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        filename: Option<String>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                bytes: bytes.into(),
                filename,
            },
        });
        self
    }

    /// All fields, in insertion order.
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// First text field with the given name.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match &part.value {
            FormValue::Text(text) if part.name == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub(crate) fn into_reqwest(self) -> reqwest::multipart::Form {
        self.parts
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, part| match part.value {
                FormValue::Text(text) => form.text(part.name, text),
                FormValue::File { bytes, filename } => {
                    let mut file = reqwest::multipart::Part::bytes(bytes);
                    if let Some(filename) = filename {
                        file = file.file_name(filename);
                    }
                    form.part(part.name, file)
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_keeps_insertion_order() {
        let form = MultipartForm::new()
            .file("file", b"abc".to_vec(), Some("a.txt".to_string()))
            .text("type", "composer")
            .text("synchronous", "true");

        let names: Vec<_> = form.parts().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["file", "type", "synchronous"]);
        assert_eq!(form.text_value("type"), Some("composer"));
        assert_eq!(form.text_value("file"), None);
        assert_eq!(form.text_value("missing"), None);
    }
}
