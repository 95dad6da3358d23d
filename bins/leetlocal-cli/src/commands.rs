// CLI commands for practising problems locally
use crate::generator::{camel_case, slugify, TemplateGenerator};
use anyhow::{bail, Context, Result};
use leetlocal_common::types::{Difficulty, Language};
use leetlocal_common::{Config, ProblemScaffold, ProblemStore, ProgressLedger};
use leetlocal_engine::executor::{self, select_sample, RunRequest, SAMPLE_SIZE};
use leetlocal_engine::{LanguageConfigManager, Reporter};
use std::fs;
use std::io::IsTerminal;
use tracing::info;

/// Everything a command needs, built once from the loaded configuration.
pub struct App {
    pub store: ProblemStore,
    pub ledger: ProgressLedger,
    pub languages: LanguageConfigManager,
    pub generator: TemplateGenerator,
    pub color: bool,
}

impl App {
    pub fn new(config: Config, color: bool) -> Self {
        Self {
            store: ProblemStore::new(&config.problems_dir),
            ledger: ProgressLedger::new(&config.progress_file),
            languages: LanguageConfigManager::from_config(&config),
            generator: TemplateGenerator::new(&config.templates_dir),
            color,
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn difficulty_label(&self, difficulty: Difficulty) -> String {
        let text = difficulty.to_string();
        match difficulty {
            Difficulty::Easy => self.paint("32", &text),
            Difficulty::Medium => self.paint("33", &text),
            Difficulty::Hard => self.paint("31", &text),
            Difficulty::Unknown => text,
        }
    }
}

/// Colour only when stdout is a terminal and NO_COLOR is unset.
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Render a solution stub for a problem
pub fn generate_solution(app: &App, id: &str, language: Language) -> Result<()> {
    let descriptor = app.store.load_descriptor(id)?;
    let solution_path = app.store.solution_path(id, language);

    if solution_path.exists() {
        bail!(
            "Solution already exists at {}. Delete it first to regenerate.",
            solution_path.display()
        );
    }

    let stub = app.generator.render_solution(&descriptor, language)?;

    if let Some(parent) = solution_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&solution_path, stub)
        .with_context(|| format!("Failed to write {}", solution_path.display()))?;

    info!(problem_id = id, language = %language, "Generated solution stub");

    println!("✓ Generated {} solution for \"{}\"", language, descriptor.title);
    println!("  Location: {}", solution_path.display());
    println!("\nNext steps:");
    println!("  1. Implement your solution in {}", solution_path.display());
    println!("  2. Run tests: leetlocal test {} --lang {}", id, language);

    Ok(())
}

/// Run a solution against the problem's tests. Returns whether every executed test passed.
pub async fn run_tests(app: &App, id: &str, language: Language, sample: bool) -> Result<bool> {
    let descriptor = app.store.load_descriptor(id)?;
    let tests = app.store.load_tests(id)?;
    let solution_path = app.store.solution_path(id, language);

    if !app.store.solution_exists(id, language) {
        bail!(
            "Solution not found at {}. Generate it first: leetlocal gen {} --lang {}",
            solution_path.display(),
            id,
            language
        );
    }

    if sample {
        let indices = select_sample(tests.len());
        if indices.len() == tests.len() {
            println!(
                "📝 Using all {} test(s) (sampling mode requested but ≤{} tests available)\n",
                tests.len(),
                SAMPLE_SIZE
            );
        } else {
            let positions: Vec<String> = indices.iter().map(|i| (i + 1).to_string()).collect();
            println!(
                "📝 Sampling {} of {} test cases: [{}]\n",
                indices.len(),
                tests.len(),
                positions.join(", ")
            );
        }
    }

    println!(
        "Running tests for \"{}\" ({})...{}",
        descriptor.title,
        language,
        if sample { " [SAMPLING MODE]" } else { "" }
    );

    let request = RunRequest {
        descriptor: &descriptor,
        tests: &tests,
        language,
        solution_path: &solution_path,
        sample,
    };
    let outcome = executor::execute(&request, &app.languages)
        .await
        .with_context(|| format!("Failed to run {} solution for {}", language, id))?;

    let reporter = Reporter::new(app.color);
    print!(
        "{}",
        reporter.report(
            &outcome.results,
            &descriptor.title,
            outcome.complexity.as_ref(),
            outcome.sampled
        )
    );

    if outcome.counts_as_solved() {
        let first_time = app
            .ledger
            .mark_solved(
                &descriptor.id,
                &descriptor.title,
                descriptor.difficulty,
                language,
                outcome.complexity,
            )
            .context("Failed to record progress")?;

        if first_time {
            println!(
                "\n🎉 First time solving \"{}\" with {}! Progress tracked.\n",
                descriptor.title,
                language.display_name()
            );
        }
    }

    Ok(outcome.all_passed())
}

/// List all problems
pub fn list_problems(app: &App) {
    let problems = app.store.list_all();

    if problems.is_empty() {
        println!("No problems found in {}.", app.store.root().display());
        println!("\n💡 Add one with: leetlocal add --title <title> --difficulty <d> --params a,b");
        return;
    }

    println!("\nAvailable Problems:\n");
    println!("{}", "─".repeat(70));
    println!("{:<20}{:<35}{:<15}", "ID", "Title", "Difficulty");
    println!("{}", "─".repeat(70));

    for problem in &problems {
        println!(
            "{:<20}{:<35}{}",
            problem.id,
            problem.title,
            app.difficulty_label(problem.difficulty)
        );
    }

    println!("{}", "─".repeat(70));
    println!("\nTotal: {} problem(s)\n", problems.len());
}

/// Show progress statistics
pub fn show_stats(app: &App) {
    let stats = app.ledger.stats(&app.store);

    println!("\n{}", "=".repeat(60));
    println!("📊 LeetLocal Progress Stats");
    println!("{}", "=".repeat(60));

    println!(
        "\n📈 Overall Progress: {}/{} problems solved",
        stats.solved, stats.total
    );

    println!("\n🎯 By Difficulty:");
    println!("   🟢 Easy:   {}", stats.difficulty_count(Difficulty::Easy));
    println!("   🟡 Medium: {}", stats.difficulty_count(Difficulty::Medium));
    println!("   🔴 Hard:   {}", stats.difficulty_count(Difficulty::Hard));
    let unrated = stats.difficulty_count(Difficulty::Unknown);
    if unrated > 0 {
        println!("   ⚪ Unknown: {}", unrated);
    }

    println!("\n💻 By Language:");
    for (language, count) in &stats.by_language {
        println!("   {}: {} solution(s)", language.display_name(), count);
    }

    if !stats.recent.is_empty() {
        println!("\n🕐 Recent Activity:");
        for (index, record) in stats.recent.iter().enumerate() {
            let complexity = record
                .complexity
                .map(|c| format!(" - {} time, {} space", c.time, c.space))
                .unwrap_or_default();
            println!(
                "   {}. {} ({}) - {}{}",
                index + 1,
                record.title,
                record.difficulty,
                record.language,
                complexity
            );
            println!("      Solved: {}", record.solved_at.format("%Y-%m-%d"));
        }
    }

    println!("\n{}\n", "=".repeat(60));
}

/// Scaffold a new problem directory
pub fn add_problem(
    app: &App,
    title: &str,
    difficulty: &str,
    id: Option<&str>,
    function: Option<&str>,
    params: &[String],
    unordered: bool,
) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        bail!("Title is required");
    }

    let difficulty = Difficulty::parse(difficulty)
        .with_context(|| format!("Difficulty must be Easy, Medium, or Hard (got '{}')", difficulty))?;

    let params: Vec<String> = params
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if params.is_empty() {
        bail!("At least one parameter is required");
    }

    let id = match id.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => id.to_string(),
        None => slugify(title),
    };
    if id.is_empty() {
        bail!("Could not derive a problem ID from '{}'; pass --id", title);
    }

    let function_name = match function.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => name.to_string(),
        None => camel_case(title),
    };

    let statement = app.generator.render_statement(title, difficulty, &params)?;
    let scaffold = ProblemScaffold {
        id: id.clone(),
        title: title.to_string(),
        difficulty,
        function_name,
        params,
        unordered,
    };
    let descriptor = app.store.create_problem(&scaffold, &statement)?;

    info!(problem_id = %descriptor.id, "Created problem");

    let dir = app.store.problem_dir(&descriptor.id);
    println!("✅ Problem \"{}\" created successfully!", descriptor.title);
    println!("\n📁 Location: {}", dir.display());
    println!("\n📝 Next steps:");
    println!("   1. Edit {}/problem.md - Add problem description", dir.display());
    println!("   2. Edit {}/problem.json - Verify function signature", dir.display());
    println!("   3. Edit {}/tests.json - Add test cases", dir.display());
    println!("   4. Generate solution: leetlocal gen {} --lang js", descriptor.id);

    Ok(())
}
