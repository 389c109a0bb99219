use chrono::Local;
use clap::Args;
use health_risk::assessment::{
    standard_questionnaire, HealthSection, QuestionKind, ScoreRequest, ScoreResult,
    ScoringEngine, ScoringRubric,
};
use health_risk::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScorecardArgs {
    /// JSON file shaped like `{"answers": [{"question_id": 1, "score": 8.0}, ...]}`
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Emit the raw score result as JSON instead of the table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QuestionsArgs {
    /// Only list questions from one section (e.g. `nutrition`)
    #[arg(long, value_parser = parse_section)]
    pub(crate) section: Option<HealthSection>,
}

pub(crate) fn run_scorecard(args: ScorecardArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.answers)?;
    let request: ScoreRequest = serde_json::from_str(&raw)?;

    let engine = ScoringEngine::default();
    let result = engine.score(&request.answers);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_scorecard(&result, engine.rubric()));
        println!("Generated {}", Local::now().format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

pub(crate) fn list_questions(args: QuestionsArgs) -> Result<(), AppError> {
    let mut current = None;
    for question in standard_questionnaire()
        .into_iter()
        .filter(|question| args.section.map_or(true, |section| question.section == section))
    {
        if current != Some(question.section) {
            println!("\n{}", question.section.label());
            current = Some(question.section);
        }
        let shape = match question.kind {
            QuestionKind::YesNo => "yes/no".to_string(),
            QuestionKind::Scale { levels } => format!("0-{levels}"),
        };
        println!(
            "  {:>2}. {} [{shape}, weight {}]",
            question.id.0, question.text, question.scoring
        );
    }
    Ok(())
}

fn render_scorecard(result: &ScoreResult, rubric: &ScoringRubric) -> String {
    let mut out = String::from("Health risk scorecard\n");
    for (section, score) in result.section_scores.iter() {
        let max = rubric.section_max(section).unwrap_or_default();
        out.push_str(&format!(
            "  {:<34} {:>7.1} / {:.0}\n",
            section.label(),
            score,
            max
        ));
    }
    out.push_str(&format!(
        "  {:<34} {:>7.1} / {:.0}\n",
        "Total",
        result.total_score,
        rubric.max_total()
    ));
    out.push_str(&format!(
        "  Percentage {:.1}% -> {}\n",
        result.percentage_score,
        result.risk_category.label()
    ));
    if result.unmapped_answers > 0 {
        out.push_str(&format!(
            "  {} answer(s) outside the questionnaire were ignored\n",
            result.unmapped_answers
        ));
    }
    out
}

fn parse_section(raw: &str) -> Result<HealthSection, String> {
    HealthSection::ordered()
        .into_iter()
        .find(|section| {
            serde_json::to_value(section)
                .ok()
                .and_then(|value| value.as_str().map(|name| name == raw.trim()))
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            format!(
                "unknown section '{raw}' (expected personal_health_habits, \
                 mental_emotional_well_being, nutrition or physical_activity)"
            )
        })
}
