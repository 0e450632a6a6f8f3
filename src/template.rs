use std::fmt;
use std::sync::OnceLock;

use log::debug;
use regex::{Captures, Regex};

use crate::session::Context;

// ---------------------------------------------------------------------------
// Render result
// ---------------------------------------------------------------------------

/// Why a template was shown unsubstituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateFault {
    /// `{name}` with no value for `name` in the context.
    MissingVariable(String),
    /// Unbalanced brace, empty `{}` or a field expression (`{a.b}`, `{a:>4}`).
    Malformed(String),
}

impl fmt::Display for TemplateFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariable(name) => write!(f, "missing variable '{name}'"),
            Self::Malformed(fragment) => write!(f, "malformed placeholder '{fragment}'"),
        }
    }
}

/// Outcome of rendering one template.
///
/// Rendering never fails outright. When any placeholder can't be resolved the
/// whole template comes back untouched as `Raw`, carrying the first fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Substituted(String),
    Raw { text: String, fault: TemplateFault },
}

impl Rendered {
    pub fn text(&self) -> &str {
        match self {
            Self::Substituted(text) | Self::Raw { text, .. } => text,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Substituted(text) | Self::Raw { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Raw { .. })
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Escaped braces first so `{{name}}` reads as a literal `{name}`.
    RE.get_or_init(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("valid placeholder regex"))
}

/// Substitute `{name}` placeholders from `context`.
///
/// `{{` and `}}` produce literal braces. All-or-nothing: one bad placeholder
/// and the caller gets the original template back.
pub fn render(template: &str, context: &Context) -> Rendered {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_re().captures_iter(template) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&template[last..whole.start]);
        last = whole.end;

        match resolve(&caps, context) {
            Ok(piece) => out.push_str(piece),
            Err(fault) => {
                debug!("Template fallback ({fault}): {template:?}");
                return Rendered::Raw {
                    text: template.to_string(),
                    fault,
                };
            }
        }
    }

    out.push_str(&template[last..]);
    Rendered::Substituted(out)
}

/// Shorthand for `render(..).into_string()` over an optional template.
/// Absent templates render as the empty string.
pub fn render_text(template: Option<&str>, context: &Context) -> String {
    match template {
        Some(t) if !t.is_empty() => render(t, context).into_string(),
        _ => String::new(),
    }
}

fn resolve<'a>(caps: &Captures<'a>, context: &'a Context) -> Result<&'a str, TemplateFault> {
    let whole = caps.get(0).map_or("", |m| m.as_str());
    match whole {
        "{{" => return Ok("{"),
        "}}" => return Ok("}"),
        _ => {}
    }

    let Some(name) = caps.get(1).map(|m| m.as_str()) else {
        return Err(TemplateFault::Malformed(whole.to_string()));
    };
    if name.is_empty() || name.contains(['.', '[', ']', ':', '!']) {
        return Err(TemplateFault::Malformed(whole.to_string()));
    }

    context
        .get(name)
        .ok_or_else(|| TemplateFault::MissingVariable(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> Context {
        let mut context = Context::default();
        for (k, v) in pairs {
            context.insert(*k, *v);
        }
        context
    }

    #[test]
    fn test_substitutes_every_placeholder() {
        let context = ctx(&[("name", "Ava"), ("price", "12")]);
        let r = render("Hi {name}, the plan is £{price}/month, {name}.", &context);
        assert_eq!(
            r,
            Rendered::Substituted("Hi Ava, the plan is £12/month, Ava.".into())
        );
    }

    #[test]
    fn test_missing_variable_returns_template_unchanged() {
        let r = render("{missing}", &Context::default());
        assert_eq!(r.text(), "{missing}");
        assert_eq!(
            r,
            Rendered::Raw {
                text: "{missing}".into(),
                fault: TemplateFault::MissingVariable("missing".into()),
            }
        );
    }

    #[test]
    fn test_no_partial_substitution() {
        let context = ctx(&[("name", "Ava")]);
        let r = render("Hello {name}, your number is {msisdn}", &context);
        assert!(r.is_fallback());
        assert_eq!(r.text(), "Hello {name}, your number is {msisdn}");
    }

    #[test]
    fn test_malformed_placeholders_fall_back() {
        let context = ctx(&[("a", "1")]);
        for template in ["open { brace", "close } brace", "empty {}", "{a.b}", "{a:>4}"] {
            let r = render(template, &context);
            assert!(
                matches!(r, Rendered::Raw { fault: TemplateFault::Malformed(_), .. }),
                "{template}"
            );
            assert_eq!(r.text(), template);
        }
    }

    #[test]
    fn test_escaped_braces() {
        let context = ctx(&[("code", "X1")]);
        assert_eq!(
            render("{{literal}} {code}", &context).into_string(),
            "{literal} X1"
        );
    }

    #[test]
    fn test_plain_and_empty_templates() {
        let context = Context::default();
        assert_eq!(
            render("No placeholders", &context),
            Rendered::Substituted("No placeholders".into())
        );
        assert_eq!(render_text(None, &context), "");
        assert_eq!(render_text(Some(""), &context), "");
    }
}
