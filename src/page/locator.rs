//! Explicit element locators.
//!
//! A `Locator` describes how to find one element and is resolved against the
//! session at interaction time, so lookups stay lazy and page objects can be
//! built before the page exists.

use std::fmt;

use thirtyfour::By;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    Name(String),
    Css(String),
    XPath(String),
    LinkText(String),
    Tag(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn name(value: impl Into<String>) -> Self {
        Locator::Name(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Locator::XPath(value.into())
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Locator::LinkText(value.into())
    }

    pub fn tag(value: impl Into<String>) -> Self {
        Locator::Tag(value.into())
    }

    pub(crate) fn by(&self) -> By {
        match self {
            Locator::Id(v) => By::Id(v.clone()),
            Locator::Name(v) => By::Name(v.clone()),
            Locator::Css(v) => By::Css(v.clone()),
            Locator::XPath(v) => By::XPath(v.clone()),
            Locator::LinkText(v) => By::LinkText(v.clone()),
            Locator::Tag(v) => By::Tag(v.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={v}"),
            Locator::Name(v) => write!(f, "name={v}"),
            Locator::Css(v) => write!(f, "css={v}"),
            Locator::XPath(v) => write!(f, "xpath={v}"),
            Locator::LinkText(v) => write!(f, "link={v}"),
            Locator::Tag(v) => write!(f, "tag={v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_strategy() {
        assert_eq!(Locator::id("user-name").to_string(), "id=user-name");
        assert_eq!(
            Locator::xpath("//*[@type='password']").to_string(),
            "xpath=//*[@type='password']"
        );
        assert_eq!(Locator::link_text("Forgot Password?").to_string(), "link=Forgot Password?");
    }
}
