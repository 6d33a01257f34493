//! Translation of user-agent design exceptions into VCL `vcl_hash` branches.
//!
//! # Design
//! - Rules use delimited regexes with trailing flags (`/pattern/iU`); VCL only
//!   accepts inline flags, so each becomes `(?iU)pattern`.
//! - A rule that is not delimited is skipped. Generation never fails because
//!   of one bad rule.
//! - The `if`/` elsif` keyword follows the rule's position in the stored
//!   sequence unless [`BranchNumbering::Emitted`] is requested.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error};
use vclgen_config::DesignExceptionRule;

/// One non-word delimiter, greedy body, closing non-word delimiter, optional flags.
const DELIMITED_PATTERN: &str = r"^[^0-9A-Za-z_](.*)[^0-9A-Za-z_]([0-9A-Za-z_]+)?$";

static DELIMITED: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(DELIMITED_PATTERN));

/// Marker for a rule that produced no branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skipped;

/// How the first branch of the chain is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BranchNumbering {
    /// Only the rule at sequence index 0 opens with `if`. A skipped first rule
    /// leaves the chain starting with ` elsif`, matching existing deployments.
    #[default]
    SourceIndex,
    /// The first emitted branch opens with `if`.
    Emitted,
}

/// How rule text is placed inside VCL string literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Insert pattern and value between plain double quotes, unchanged.
    #[default]
    Verbatim,
    /// Use long-string syntax when the text cannot sit in a plain string.
    Escaped,
}

/// Options controlling design exception code generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Keyword selection for the branch chain.
    pub numbering: BranchNumbering,
    /// String literal policy.
    pub interpolation: Interpolation,
}

/// Convert a delimited regex (`/body/flags`) into inline-flag form.
///
/// # Errors
///
/// Returns [`Skipped`] when the input is not wrapped in non-word delimiters.
/// A lone `0` flag counts as no flags.
pub fn inline_modifiers(pattern: &str) -> Result<String, Skipped> {
    let regex = DELIMITED.as_ref().map_err(|err| {
        error!(
            error = %err,
            pattern = DELIMITED_PATTERN,
            "delimiter pattern failed to compile"
        );
        Skipped
    })?;
    let captures = regex.captures(pattern).ok_or(Skipped)?;
    let body = captures.get(1).map_or("", |m| m.as_str());

    Ok(match captures.get(2).filter(|flags| flags.as_str() != "0") {
        Some(flags) => format!("(?{}){body}", flags.as_str()),
        None => body.to_string(),
    })
}

/// Quote text as a VCL string literal.
///
/// In `Escaped` mode text containing `"` or a line break is wrapped in
/// `{"..."}`; text that also contains `"}` cannot be quoted and yields `None`.
#[must_use]
pub fn quote_vcl_string(text: &str, interpolation: Interpolation) -> Option<String> {
    match interpolation {
        Interpolation::Verbatim => Some(format!("\"{text}\"")),
        Interpolation::Escaped => {
            if !text.contains(['"', '\n', '\r']) {
                Some(format!("\"{text}\""))
            } else if text.contains("\"}") {
                None
            } else {
                Some(format!("{{\"{text}\"}}"))
            }
        }
    }
}

/// A translated rule ready to be placed in the branch chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    condition: String,
    value: String,
}

impl Branch {
    /// Render the branch opening with `keyword` (`if` or ` elsif`).
    #[must_use]
    pub fn render(&self, keyword: &str) -> String {
        format!(
            "{keyword} (req.http.user-agent ~ {}) {{\n        hash_data({});\n    }}",
            self.condition, self.value
        )
    }
}

/// Translate one rule into a branch.
///
/// # Errors
///
/// Returns [`Skipped`] when the pattern is not delimited or, in `Escaped`
/// mode, when a field cannot be quoted.
pub fn translate_rule(
    rule: &DesignExceptionRule,
    interpolation: Interpolation,
) -> Result<Branch, Skipped> {
    let pattern = inline_modifiers(&rule.regexp)?;
    let condition = quote_vcl_string(&pattern, interpolation).ok_or(Skipped)?;
    let value = quote_vcl_string(&rule.value, interpolation).ok_or(Skipped)?;
    Ok(Branch { condition, value })
}

/// Build the `if`/` elsif` chain for an ordered rule sequence.
///
/// Blocks are concatenated directly; the leading space of ` elsif` joins each
/// block onto the closing brace of the previous one.
#[must_use]
pub fn design_exceptions_code(rules: &[DesignExceptionRule], options: TranspileOptions) -> String {
    let mut code = String::new();
    let mut emitted = 0_usize;

    for (index, rule) in rules.iter().enumerate() {
        let Ok(branch) = translate_rule(rule, options.interpolation) else {
            debug!(index, regexp = %rule.regexp, "skipping design exception");
            continue;
        };

        let position = match options.numbering {
            BranchNumbering::SourceIndex => index,
            BranchNumbering::Emitted => emitted,
        };
        let keyword = if position == 0 { "if" } else { " elsif" };
        code.push_str(&branch.render(keyword));
        emitted += 1;
    }

    code
}
