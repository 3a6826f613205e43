use std::io::Write;

use anyhow::Result;
use school_quiz::{
    ApiClient, Config, GradeOutcome, Level1Choice, Question, QuestionKind, QuizController,
    QuizSummary, Response,
    config::LoggingConfig,
    log_system_event,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging first so configuration loading is recorded
    let _guard = setup_logging(&LoggingConfig::from_env()?)?;

    let config = Config::from_env()?;
    config.validate()?;

    log_system_event!(startup, component = "terminal", "Starting quiz client");

    let client = ApiClient::from_config(&config.api);
    info!(base_url = %client.base_url(), "API client ready");

    let mut controller = QuizController::new(client);
    let mut prompt = Prompt::new();
    let mut rng = rand::thread_rng();

    'title: loop {
        if let Err(notice) = controller.load_categories().await {
            println!("! {}", notice.message);
            if !prompt.confirm("Try again? [y/N] ").await? {
                break;
            }
            continue;
        }

        if !choose_folder(&mut controller, &mut prompt).await? {
            break;
        }

        if let Err(notice) = controller.start_quiz(&mut rng).await {
            println!("! {}", notice.message);
            continue;
        }
        println!("\nFolder: {}", controller.selector().label());

        loop {
            if !run_questions(&mut controller, &mut prompt).await? {
                break 'title;
            }
            let Some(summary) = controller.summary() else {
                break;
            };
            print_summary(&summary);

            match prompt.ask("[r] retry  [t] title  [q] quit: ").await?.as_deref().map(str::trim) {
                Some("r") => {
                    if let Err(notice) = controller.retry() {
                        println!("! {}", notice.message);
                        break;
                    }
                }
                Some("t") => {
                    controller.return_to_title();
                    break;
                }
                _ => break 'title,
            }
        }
    }

    log_system_event!(shutdown, component = "terminal", "Quiz client stopped");
    Ok(())
}

/// Line-oriented stdin reader; `None` means the input was closed
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        print!("{}", label);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    async fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.ask(label).await?;
        Ok(matches!(answer.as_deref().map(str::trim), Some("y" | "Y")))
    }
}

/// Walk the three folder levels; returns false when input ends
async fn choose_folder(
    controller: &mut QuizController<ApiClient>,
    prompt: &mut Prompt,
) -> Result<bool> {
    loop {
        let folders: Vec<String> = controller
            .selector()
            .tree()
            .level1_options()
            .into_iter()
            .map(str::to_string)
            .collect();
        let has_unclassified = controller.selector().tree().has_unclassified();

        println!("\nChoose a folder:");
        println!("  0) (all)");
        for (i, folder) in folders.iter().enumerate() {
            println!("  {}) {}", i + 1, folder);
        }
        if has_unclassified {
            println!("  u) (unclassified)");
        }

        let Some(line) = prompt.ask("> ").await? else {
            return Ok(false);
        };
        let choice = match line.trim() {
            "" | "0" => Level1Choice::All,
            "u" if has_unclassified => Level1Choice::Unclassified,
            other => match pick(other, &folders) {
                Some(folder) => Level1Choice::Folder(folder),
                None => {
                    println!("! Unknown choice");
                    continue;
                }
            },
        };
        if let Err(e) = controller.selector_mut().select_level1(choice) {
            println!("! {}", e);
            continue;
        }
        break;
    }

    for level in [2, 3] {
        let enabled = if level == 2 {
            controller.selector().level2_enabled()
        } else {
            controller.selector().level3_enabled()
        };
        if !enabled {
            break;
        }
        let options: Vec<String> = if level == 2 {
            controller.selector().level2_options()
        } else {
            controller.selector().level3_options()
        }
        .into_iter()
        .map(str::to_string)
        .collect();
        if options.is_empty() {
            break;
        }

        println!("\nLevel {} (blank for the whole folder):", level);
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
        let Some(line) = prompt.ask("> ").await? else {
            return Ok(false);
        };
        let Some(choice) = pick(line.trim(), &options) else {
            break;
        };
        let selector = controller.selector_mut();
        let result = if level == 2 {
            selector.select_level2(Some(choice))
        } else {
            selector.select_level3(Some(choice))
        };
        if let Err(e) = result {
            println!("! {}", e);
            break;
        }
    }
    Ok(true)
}

fn pick(input: &str, options: &[String]) -> Option<String> {
    let index = input.parse::<usize>().ok()?.checked_sub(1)?;
    options.get(index).cloned()
}

/// Ask every remaining question; returns false when input ends
async fn run_questions(
    controller: &mut QuizController<ApiClient>,
    prompt: &mut Prompt,
) -> Result<bool> {
    while let Some(question) = controller.current_question().cloned() {
        let position = controller.runner().session().map_or(0, |s| s.cursor()) + 1;
        let total = controller.runner().session().map_or(0, |s| s.total());
        println!("\nQ{}/{} [{}] {}", position, total, question.category, question.text);

        let Some(response) = read_response(&question, prompt).await? else {
            return Ok(false);
        };
        if !controller.can_submit(&response) {
            println!("! Please answer before submitting");
            continue;
        }
        match controller.submit(&response) {
            Ok(outcome) => print_outcome(&question, &outcome),
            Err(notice) => println!("! {}", notice.message),
        }
    }
    Ok(true)
}

async fn read_response(question: &Question, prompt: &mut Prompt) -> Result<Option<Response>> {
    match &question.kind {
        QuestionKind::Single { choices, .. } | QuestionKind::Multi { choices, .. } => {
            for (i, choice) in choices.iter().enumerate() {
                println!("  {}) {}", i + 1, choice);
            }
            let multi = matches!(question.kind, QuestionKind::Multi { .. });
            let label = if multi { "Choices (e.g. 1,3): " } else { "Choice: " };
            let Some(line) = prompt.ask(label).await? else {
                return Ok(None);
            };
            let picked: Vec<usize> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter_map(|part| part.parse::<usize>().ok())
                .filter_map(|n| n.checked_sub(1))
                .collect();
            if multi {
                Ok(Some(Response::Multi(picked)))
            } else {
                Ok(Some(Response::Single(picked.first().copied().unwrap_or(usize::MAX))))
            }
        }
        QuestionKind::Text { .. } => Ok(prompt.ask("Answer: ").await?.map(Response::Text)),
        QuestionKind::MultiText { .. } => {
            let mut entries = Vec::with_capacity(question.multi_text_slots());
            for slot in 1..=question.multi_text_slots() {
                let Some(line) = prompt.ask(&format!("Answer {}: ", slot)).await? else {
                    return Ok(None);
                };
                entries.push(line);
            }
            Ok(Some(Response::MultiText(entries)))
        }
    }
}

fn print_outcome(question: &Question, outcome: &GradeOutcome) {
    if outcome.correct {
        println!("Correct!");
    } else {
        println!("Incorrect. Answer: {}", outcome.correct_answer);
    }
    if let Some(explain) = question.explain.as_deref().filter(|e| !e.trim().is_empty()) {
        println!("  {}", explain);
    }
}

fn print_summary(summary: &QuizSummary) {
    println!("\nScore: {} / {}", summary.score, summary.total);
    if summary.all_correct() {
        println!("All correct!");
        return;
    }
    println!("Review:");
    for wrong in &summary.wrong_list {
        println!("- {}", wrong.question_text);
        println!("    your answer:    {}", wrong.your_answer);
        println!("    correct answer: {}", wrong.correct_answer);
    }
}

fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use std::fs;
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| EnvFilter::new("info,school_quiz=debug"));

    // Console output goes to stderr so it never mixes with the quiz prompts
    let console_layer = config.console_enabled.then(|| {
        fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
    });

    let mut guard = None;
    let file_layer = if config.file_enabled {
        fs::create_dir_all(&config.log_directory).unwrap_or_else(|e| {
            eprintln!("Warning: Could not create logs directory: {}", e);
        });
        let file_appender = tracing_appender::rolling::daily(&config.log_directory, "school-quiz.log");
        let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);
        Some(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(non_blocking_file),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(
        directory = %config.log_directory,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(guard)
}
