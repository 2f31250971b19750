//! Legacy XML notification payloads.
//!
//! Older alarm panels post a small XML document whose only interesting field
//! is `<UserString>`, holding the colour code:
//!
//! ```text
//! <Notification>
//!   <UserString>A</UserString>
//! </Notification>
//! ```
//!
//! The element may appear at any depth; the first occurrence wins.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::color::{BulbColor, ColorCommand};
use crate::error::{CoreError, Result};

/// Name of the element carrying the colour code.
pub const USER_STRING_ELEMENT: &str = "UserString";

/// A decoded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Text content of `<UserString>`, trimmed.
    pub user_string: String,
}

impl Notification {
    /// Decode a notification from an XML document.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyPayload`] if the body is empty or only whitespace
    /// - [`CoreError::InvalidXml`] if the document is not well-formed or has
    ///   no root element
    /// - [`CoreError::MissingElement`] if there is no `<UserString>` element
    pub fn from_xml(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(CoreError::EmptyPayload);
        }

        let mut reader = Reader::from_str(body);
        let mut depth = 0usize;
        let mut saw_element = false;
        let mut capture: Option<String> = None;
        let mut found: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    if depth == 0 && saw_element {
                        return Err(second_root());
                    }
                    depth += 1;
                    saw_element = true;
                    if found.is_none()
                        && capture.is_none()
                        && start.local_name().as_ref() == USER_STRING_ELEMENT.as_bytes()
                    {
                        capture = Some(String::new());
                    }
                }
                Ok(Event::Empty(empty)) => {
                    if depth == 0 && saw_element {
                        return Err(second_root());
                    }
                    saw_element = true;
                    if found.is_none()
                        && capture.is_none()
                        && empty.local_name().as_ref() == USER_STRING_ELEMENT.as_bytes()
                    {
                        found = Some(String::new());
                    }
                }
                Ok(Event::Text(text)) => {
                    if depth == 0 && !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(text_outside_root());
                    }
                    if let Some(buf) = capture.as_mut() {
                        let unescaped = text
                            .unescape()
                            .map_err(|e| CoreError::InvalidXml(e.to_string()))?;
                        buf.push_str(&unescaped);
                    }
                }
                Ok(Event::CData(data)) => {
                    if depth == 0 {
                        return Err(text_outside_root());
                    }
                    if let Some(buf) = capture.as_mut() {
                        let raw = data.into_inner();
                        let text = std::str::from_utf8(&raw)
                            .map_err(|e| CoreError::InvalidXml(e.to_string()))?;
                        buf.push_str(text);
                    }
                }
                Ok(Event::End(end)) => {
                    depth = depth.saturating_sub(1);
                    if capture.is_some()
                        && end.local_name().as_ref() == USER_STRING_ELEMENT.as_bytes()
                    {
                        found = capture.take();
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(CoreError::InvalidXml(format!(
                        "at position {}: {e}",
                        reader.error_position()
                    )))
                }
            }
        }

        if !saw_element {
            return Err(CoreError::InvalidXml("no root element".to_string()));
        }
        if depth != 0 {
            return Err(CoreError::InvalidXml("unclosed element".to_string()));
        }

        let user_string = found.ok_or(CoreError::MissingElement(USER_STRING_ELEMENT))?;
        Ok(Self {
            user_string: user_string.trim().to_string(),
        })
    }

    /// The colour this notification selects.
    #[must_use]
    pub fn color(&self) -> BulbColor {
        BulbColor::from_code(&self.user_string)
    }

    /// The normalised colour command for this notification.
    #[must_use]
    pub fn command(&self) -> ColorCommand {
        ColorCommand::from_code(&self.user_string)
    }
}

fn second_root() -> CoreError {
    CoreError::InvalidXml("more than one root element".to_string())
}

fn text_outside_root() -> CoreError {
    CoreError::InvalidXml("text outside the root element".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_user_string() {
        let n = Notification::from_xml(
            r#"<?xml version="1.0"?><Notification><UserString>V</UserString></Notification>"#,
        )
        .unwrap();
        assert_eq!(n.user_string, "V");
        assert_eq!(n.color(), BulbColor::Red);
    }

    #[test]
    fn nested_and_trimmed() {
        let n = Notification::from_xml(
            "<a><b><UserString>\n  b \n</UserString></b><UserString>R</UserString></a>",
        )
        .unwrap();
        assert_eq!(n.user_string, "b");
        assert_eq!(n.command().code, "B");
        assert_eq!(n.color(), BulbColor::Blue);
    }

    #[test]
    fn cdata_content() {
        let n = Notification::from_xml("<n><UserString><![CDATA[A]]></UserString></n>").unwrap();
        assert_eq!(n.color(), BulbColor::Green);
    }

    #[test]
    fn escaped_content() {
        let n = Notification::from_xml("<n><UserString>&lt;x&gt;</UserString></n>").unwrap();
        assert_eq!(n.user_string, "<x>");
        assert_eq!(n.color(), BulbColor::Black);
    }

    #[test]
    fn empty_element_is_black() {
        let n = Notification::from_xml("<n><UserString/></n>").unwrap();
        assert_eq!(n.user_string, "");
        assert_eq!(n.color(), BulbColor::Black);
    }

    #[test]
    fn missing_element() {
        let err = Notification::from_xml("<n><Other>A</Other></n>").unwrap_err();
        assert!(matches!(err, CoreError::MissingElement("UserString")));
    }

    #[test]
    fn empty_body() {
        assert!(matches!(
            Notification::from_xml("  \n"),
            Err(CoreError::EmptyPayload)
        ));
    }

    #[test]
    fn not_xml() {
        for body in [
            "just some text",
            "garbage<n><UserString>A</UserString></n>",
            "<n><UserString>A</UserString></n>trailing junk",
            "<![CDATA[A]]><n><UserString>A</UserString></n>",
        ] {
            assert!(
                matches!(Notification::from_xml(body), Err(CoreError::InvalidXml(_))),
                "body {body:?}"
            );
        }
    }

    #[test]
    fn single_root_only() {
        for body in [
            "<a/><b><UserString>A</UserString></b>",
            "<n><UserString>A</UserString></n><n/>",
        ] {
            assert!(
                matches!(Notification::from_xml(body), Err(CoreError::InvalidXml(_))),
                "body {body:?}"
            );
        }
    }

    #[test]
    fn whitespace_around_root() {
        let n = Notification::from_xml(
            "<?xml version=\"1.0\"?>\n<!-- panel -->\n<n><UserString>B</UserString></n>\n",
        )
        .unwrap();
        assert_eq!(n.user_string, "B");
    }

    #[test]
    fn mismatched_tags() {
        assert!(matches!(
            Notification::from_xml("<n><UserString>A</Wrong></n>"),
            Err(CoreError::InvalidXml(_))
        ));
    }

    #[test]
    fn unclosed_root() {
        assert!(Notification::from_xml("<n><UserString>A</UserString>").is_err());
    }
}
