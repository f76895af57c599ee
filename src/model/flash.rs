use std::fmt::{Display, Formatter};

/// A one-shot notification shown on the next rendered page.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Flash {
    #[serde(rename = "type")]
    pub kind: FlashKind,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Fail,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Flash {
        Flash {
            kind: FlashKind::Success,
            text: text.into(),
        }
    }

    pub fn fail(text: impl Into<String>) -> Flash {
        Flash {
            kind: FlashKind::Fail,
            text: text.into(),
        }
    }
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Fail => "fail",
        }
    }

    /// Anything that isn't a known kind is shown as a failure.
    pub fn parse(kind: &str) -> FlashKind {
        match kind {
            "success" => FlashKind::Success,
            _ => FlashKind::Fail,
        }
    }
}

impl Display for FlashKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
