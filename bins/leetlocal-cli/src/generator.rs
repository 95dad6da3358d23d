// Template rendering for solution stubs and problem statements
use anyhow::{Context, Result};
use handlebars::Handlebars;
use leetlocal_common::types::{Difficulty, Language, ProblemDescriptor};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub const STATEMENT_TEMPLATE: &str = "problem.md.tpl";

const BUILTIN_JS_SOLUTION: &str = include_str!("../../../templates/js.solution.tpl");
const BUILTIN_PYTHON_SOLUTION: &str = include_str!("../../../templates/python.solution.tpl");
const BUILTIN_STATEMENT: &str = include_str!("../../../templates/problem.md.tpl");

pub struct TemplateGenerator {
    handlebars: Handlebars<'static>,
    templates_dir: PathBuf,
}

impl TemplateGenerator {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // Output is source code and markdown, not HTML.
        handlebars.register_escape_fn(handlebars::no_escape);

        Self {
            handlebars,
            templates_dir: templates_dir.into(),
        }
    }

    /// Solution stub for a problem, rendered from `<lang>.solution.tpl`.
    pub fn render_solution(&self, descriptor: &ProblemDescriptor, language: Language) -> Result<String> {
        let file_name = solution_template(language);
        let template = self.load_template(&file_name)?;

        let data = json!({
            "id": descriptor.id,
            "title": descriptor.title,
            "difficulty": descriptor.difficulty.to_string(),
            "functionName": descriptor.function.name,
            "params": descriptor.function.params,
            "paramList": descriptor.function.params.join(", "),
        });

        self.handlebars
            .render_template(&template, &data)
            .with_context(|| format!("Failed to render {}", file_name))
    }

    /// Initial `problem.md` for a new problem.
    pub fn render_statement(&self, title: &str, difficulty: Difficulty, params: &[String]) -> Result<String> {
        let template = self.load_template(STATEMENT_TEMPLATE)?;

        let data = json!({
            "title": title,
            "difficulty": difficulty.to_string(),
            "params": params,
            "paramList": params.join(", "),
        });

        self.handlebars
            .render_template(&template, &data)
            .with_context(|| format!("Failed to render {}", STATEMENT_TEMPLATE))
    }

    /// A file in the templates directory wins over the built-in copy.
    fn load_template(&self, file_name: &str) -> Result<String> {
        let path = self.templates_dir.join(file_name);
        if path.exists() {
            debug!(path = %path.display(), "Using template from disk");
            return fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()));
        }

        builtin_template(file_name)
            .map(str::to_string)
            .with_context(|| format!("Template not found: {}", file_name))
    }
}

pub fn solution_template(language: Language) -> String {
    format!("{}.solution.tpl", language.dir_name())
}

fn builtin_template(file_name: &str) -> Option<&'static str> {
    match file_name {
        "js.solution.tpl" => Some(BUILTIN_JS_SOLUTION),
        "python.solution.tpl" => Some(BUILTIN_PYTHON_SOLUTION),
        STATEMENT_TEMPLATE => Some(BUILTIN_STATEMENT),
        _ => None,
    }
}

/// "Two Sum II - Input Array" -> "two-sum-ii-input-array"
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// "Two Sum II" -> "twoSumII"
pub fn camel_case(text: &str) -> String {
    let mut out = String::new();
    let mut upper_next = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if out.is_empty() {
                out.push(c.to_ascii_lowercase());
            } else if upper_next {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }

    out
}
