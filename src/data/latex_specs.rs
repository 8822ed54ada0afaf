//! Built-in LaTeX specs
//!
//! Argument signatures of the common LaTeX macros and environments, plus the
//! usual text specials. The tables use the compact argument strings accepted
//! by [`MacroSpec::new`].

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::core::registry::SpecRegistry;
use crate::core::specs::{EnvironmentSpec, MacroSpec, SpecialsSpec};
use crate::core::state::StateChange;

pub const BASE_CATEGORY: &str = "latex-base";
pub const ENVIRONMENTS_CATEGORY: &str = "latex-environments";
pub const SPECIALS_CATEGORY: &str = "latex-specials";

// ============================================================================
// Macros
// ============================================================================

/// Macro name and compact argument string
pub static BASE_MACROS: &[(&str, &str)] = &[
    // ---- Document structure ----
    ("documentclass", "[{"),
    ("usepackage", "[{"),
    ("title", "[{"),
    ("author", "[{"),
    ("date", "{"),
    ("maketitle", ""),
    ("tableofcontents", ""),
    ("part", "*[{"),
    ("chapter", "*[{"),
    ("section", "*[{"),
    ("subsection", "*[{"),
    ("subsubsection", "*[{"),
    ("paragraph", "*[{"),
    ("subparagraph", "*[{"),
    // ---- Font ----
    ("textbf", "{"),
    ("textit", "{"),
    ("textsl", "{"),
    ("textsc", "{"),
    ("texttt", "{"),
    ("textrm", "{"),
    ("textsf", "{"),
    ("textup", "{"),
    ("textmd", "{"),
    ("emph", "{"),
    ("underline", "{"),
    ("bfseries", ""),
    ("itshape", ""),
    ("ttfamily", ""),
    // ---- References ----
    ("label", "{"),
    ("ref", "{"),
    ("eqref", "{"),
    ("pageref", "{"),
    ("cite", "*[[{"),
    ("footnote", "[{"),
    ("url", "{"),
    ("href", "{{"),
    // ---- Lists and floats ----
    ("item", "["),
    ("caption", "[{"),
    ("includegraphics", "*[[{"),
    ("centering", ""),
    // ---- Spacing ----
    ("hspace", "*{"),
    ("vspace", "*{"),
    ("newline", ""),
    ("newpage", ""),
    ("\\", "*["),
    // ---- Math ----
    ("frac", "{{"),
    ("dfrac", "{{"),
    ("tfrac", "{{"),
    ("binom", "{{"),
    ("sqrt", "[{"),
    ("mathrm", "{"),
    ("mathbf", "{"),
    ("mathit", "{"),
    ("mathcal", "{"),
    ("mathbb", "{"),
    ("operatorname", "*{"),
    ("text", "{"),
    ("left", "{"),
    ("right", "{"),
    // ---- Definitions ----
    ("newcommand", "*{[[{"),
    ("renewcommand", "*{[[{"),
    ("providecommand", "*{[[{"),
    ("newenvironment", "*{[[{{"),
    ("renewenvironment", "*{[[{{"),
];

/// Math shift macros and the mode they switch the following content to
static MATH_SWITCH_MACROS: &[(&str, bool)] = &[("(", true), (")", false), ("[", true), ("]", false)];

// ============================================================================
// Environments
// ============================================================================

pub static BASE_ENVIRONMENTS: &[(&str, &str)] = &[
    ("document", ""),
    ("abstract", ""),
    ("itemize", "["),
    ("enumerate", "["),
    ("description", "["),
    ("figure", "*["),
    ("table", "*["),
    ("center", ""),
    ("flushleft", ""),
    ("flushright", ""),
    ("quote", ""),
    ("quotation", ""),
    ("verse", ""),
    ("minipage", "[[[{"),
    ("tabular", "[{"),
    ("thebibliography", "{"),
];

/// Environments whose body is math
pub static MATH_ENVIRONMENTS: &[(&str, &str)] = &[
    ("equation", ""),
    ("equation*", ""),
    ("align", ""),
    ("align*", ""),
    ("gather", ""),
    ("gather*", ""),
    ("multline", ""),
    ("multline*", ""),
    ("eqnarray", ""),
    ("eqnarray*", ""),
    ("displaymath", ""),
    ("math", ""),
    ("array", "[{"),
    ("matrix", ""),
    ("pmatrix", ""),
    ("bmatrix", ""),
    ("cases", ""),
];

// ============================================================================
// Specials
// ============================================================================

/// Text specials. `---` comes before `--` so that it wins at a shared prefix.
pub static BASE_SPECIALS: &[&str] = &["~", "&", "---", "--", "``", "''"];

// ============================================================================
// Registry
// ============================================================================

fn macro_spec(name: &str, argspec: &str) -> MacroSpec {
    MacroSpec::new(name, argspec).unwrap_or_else(|err| {
        tracing::error!(macro_name = name, %err, "invalid built-in macro spec");
        MacroSpec::no_arguments(name)
    })
}

fn environment_spec(name: &str, argspec: &str) -> EnvironmentSpec {
    EnvironmentSpec::new(name, argspec).unwrap_or_else(|err| {
        tracing::error!(environment = name, %err, "invalid built-in environment spec");
        EnvironmentSpec::no_arguments(name)
    })
}

/// Build a fresh, frozen registry holding the built-in specs
pub fn build_default_registry() -> SpecRegistry {
    let macros = BASE_MACROS
        .iter()
        .map(|(name, argspec)| macro_spec(name, argspec))
        .chain(MATH_SWITCH_MACROS.iter().map(|(name, math)| {
            MacroSpec::no_arguments(*name).with_after_state(StateChange::MathMode(*math))
        }));

    let environments = BASE_ENVIRONMENTS
        .iter()
        .map(|(name, argspec)| environment_spec(name, argspec))
        .chain(MATH_ENVIRONMENTS.iter().map(|(name, argspec)| {
            environment_spec(name, argspec).with_body_state(StateChange::MathMode(true))
        }));

    let specials = BASE_SPECIALS.iter().map(|symbol| SpecialsSpec::new(*symbol));

    let mut registry = SpecRegistry::new();
    let layers = [
        registry.add_context_category(BASE_CATEGORY, macros, [], []),
        registry.add_context_category(ENVIRONMENTS_CATEGORY, [], environments, []),
        registry.add_context_category(SPECIALS_CATEGORY, [], [], specials),
    ];
    for result in layers {
        if let Err(err) = result {
            tracing::error!(%err, "failed to add built-in category");
        }
    }
    registry.freeze();
    registry
}

lazy_static! {
    /// Shared frozen registry with the built-in LaTeX specs
    pub static ref DEFAULT_REGISTRY: Arc<SpecRegistry> = Arc::new(build_default_registry());
}
