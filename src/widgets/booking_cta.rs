use htmlescape::{encode_attribute, encode_minimal};

pub const OBSERVED_INPUTS: [&str; 4] = ["label", "variant", "plan", "target"];

const DEFAULT_LABEL: &str = "Book a discovery call";
const DEFAULT_TARGET: &str = "_blank";
const UNAVAILABLE_LABEL: &str = "Booking unavailable";
const REL: &str = "noopener noreferrer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CtaVariant {
    #[default]
    Primary,
    Ghost,
    Inline,
}

impl CtaVariant {
    /// Unknown variants fall back to `Primary`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ghost" => Self::Ghost,
            "inline" => Self::Inline,
            _ => Self::Primary,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Primary => "btn btn-primary",
            Self::Ghost => "btn btn-ghost",
            Self::Inline => "cta-inline",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CtaProps {
    pub label: Option<String>,
    pub variant: Option<String>,
    pub plan: Option<String>,
    pub target: Option<String>,
}

impl CtaProps {
    /// Applies an input change. Returns `false` for inputs the widget does not
    /// observe, in which case nothing needs to be re-rendered.
    pub fn set(&mut self, name: &str, value: Option<String>) -> bool {
        let slot = match name {
            "label" => &mut self.label,
            "variant" => &mut self.variant,
            "plan" => &mut self.plan,
            "target" => &mut self.target,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Progress of the one-off booking URL lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Pending,
    Resolved(String),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Loading,
    Ready,
    Failed,
}

impl LoadingState {
    /// Value of the `data-loading` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingState::Loading => "true",
            LoadingState::Ready => "false",
            LoadingState::Failed => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtaView {
    pub class_name: &'static str,
    pub label: String,
    pub href: Option<String>,
    pub target: String,
    pub rel: &'static str,
    pub aria_disabled: bool,
    pub loading: LoadingState,
}

impl CtaView {
    pub fn to_html(&self) -> String {
        let mut attributes = format!(
            r#"class="{}" target="{}" rel="{}" data-loading="{}""#,
            self.class_name,
            encode_attribute(&self.target),
            self.rel,
            self.loading.as_str()
        );
        if let Some(href) = &self.href {
            attributes.push_str(&format!(r#" href="{}""#, encode_attribute(href)));
        }
        if self.aria_disabled {
            attributes.push_str(r#" aria-disabled="true""#);
        }
        format!("<a {}>{}</a>", attributes, encode_minimal(&self.label))
    }
}

pub fn render(props: &CtaProps, resolution: &Resolution) -> CtaView {
    let variant = props
        .variant
        .as_deref()
        .map(CtaVariant::parse)
        .unwrap_or_default();
    let label = non_empty(&props.label).unwrap_or(DEFAULT_LABEL);
    let target = non_empty(&props.target).unwrap_or(DEFAULT_TARGET);

    let (label, href, loading) = match resolution {
        Resolution::Pending => (label, None, LoadingState::Loading),
        Resolution::Resolved(base_url) => (
            label,
            Some(with_plan(base_url, non_empty(&props.plan))),
            LoadingState::Ready,
        ),
        Resolution::Failed => (UNAVAILABLE_LABEL, None, LoadingState::Failed),
    };

    CtaView {
        class_name: variant.class_name(),
        label: label.to_string(),
        aria_disabled: href.is_none(),
        href,
        target: target.to_string(),
        rel: REL,
        loading,
    }
}

pub fn with_plan(url: &str, plan: Option<&str>) -> String {
    match plan {
        Some(plan) if !plan.is_empty() => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{}{}plan={}", url, separator, urlencoding::encode(plan))
        }
        _ => url.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
