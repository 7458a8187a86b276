//! Token substitution for phrase templates.
//!
//! Templates are opaque strings from the pool; the core only knows the six
//! tokens below. Unknown tokens are left in place (they belong to some other
//! layer), absent values render as empty.

/// Values available to a template at render time.
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    pub exercise: Option<String>,
    pub next: Option<String>,
    pub cue: Option<String>,
    pub remaining_secs: Option<u32>,
    pub set_number: Option<u32>,
    pub round_number: Option<u32>,
}

pub fn render(template: &str, args: &RenderArgs) -> String {
    let mut out = template.to_string();
    let subs: [(&str, String); 6] = [
        ("{exercise}", args.exercise.clone().unwrap_or_default()),
        ("{next}", args.next.clone().unwrap_or_default()),
        ("{cue}", args.cue.clone().unwrap_or_default()),
        (
            "{remaining}",
            args.remaining_secs.map(|s| s.to_string()).unwrap_or_default(),
        ),
        (
            "{set}",
            args.set_number.map(|s| s.to_string()).unwrap_or_default(),
        ),
        (
            "{round}",
            args.round_number.map(|r| r.to_string()).unwrap_or_default(),
        ),
    ];
    for (token, value) in subs {
        if out.contains(token) {
            out = out.replace(token, &value);
        }
    }
    out.trim().to_string()
}
