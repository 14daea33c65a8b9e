//! The `assessa init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create assessa.toml
    if std::path::Path::new("assessa.toml").exists() {
        println!("assessa.toml already exists, skipping.");
    } else {
        std::fs::write("assessa.toml", SAMPLE_CONFIG)?;
        println!("Created assessa.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit assessa.toml with your learner id");
    println!("  2. Run: assessa validate --quiz quizzes/example.toml");
    println!("  3. Run: assessa take --quiz ppe-basics");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# assessa configuration

learner_id = "${USER}"
# course_id = "onboarding"
quiz_dir = "./quizzes"
store_dir = "./assessa-attempts"
enforce_max_attempts = true
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "ppe-basics"
title = "Personal Protective Equipment Basics"
passing_score = 70
time_limit_minutes = 5
max_attempts = 3

[[questions]]
id = "eyes"
type = "multiple-choice"
prompt = "Which item protects your eyes from chemical splashes?"
options = ["Safety goggles", "Earplugs", "Steel-toe boots"]
correct_answer = "Safety goggles"
points = 5

[[questions]]
id = "gloves"
type = "true-false"
prompt = "Gloves should be inspected for damage before every use."
correct_answer = "true"
points = 5

[[questions]]
id = "acronym"
type = "short-answer"
prompt = "What does PPE stand for?"
correct_answer = "Personal Protective Equipment"
points = 5
reference_timestamp = 95.0
"#;
