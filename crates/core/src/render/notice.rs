//! Error and warning fragments shown in place of results.

use super::fragment::Element;

pub fn error(message: &str) -> Element {
    Element::new("div").class("oql-error").text(message)
}

pub fn warning(message: &str) -> Element {
    Element::new("div").class("oql-warning").text(message)
}
