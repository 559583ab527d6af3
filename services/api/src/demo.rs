use crate::infra::{in_memory_service, InMemoryActivityRepository, InMemoryService};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use jobtrackr::config::AppConfig;
use jobtrackr::error::AppError;
use jobtrackr::gamification::{
    ActivityKind, ActivityOutcome, ApplicationRecord, ApplicationStatus, DocumentKind,
    DocumentRecord, GamificationSummary, GoalPeriod, GoalType, InterviewRecord, NewGoal, UserId,
};
use jobtrackr::search::{clamp_limit, rank, CatalogSource, CsvCatalogSource};
use std::path::PathBuf;

const WEEKLY_GOAL_TARGET: i64 = 5;
const COMPANIES: [&str; 5] = ["Alan", "Doctolib", "Qonto", "Back Market", "Swile"];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Identifier of the demo user.
    #[arg(long, default_value = "demo-user")]
    pub(crate) user: String,
    /// First day of the replay (YYYY-MM-DD). Defaults to `days - 1` days ago.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Number of consecutive days with one application each.
    #[arg(long, default_value_t = 7)]
    pub(crate) days: u32,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Free-text job title query.
    pub(crate) query: String,
    /// CSV referential to search (defaults to APP_JOB_TITLES_PATH).
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Maximum number of matches to print.
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let SearchArgs {
        query,
        catalog,
        limit,
    } = args;

    let path = match catalog {
        Some(path) => path,
        None => AppConfig::load()?.search.catalog_path,
    };
    let titles = CsvCatalogSource::new(path.clone()).load()?;
    let results = rank(&query, &titles, clamp_limit(limit));

    println!(
        "{} match(es) for '{}' in {} ({} titles)",
        results.len(),
        query,
        path.display(),
        titles.len()
    );
    for entry in &results {
        println!(
            "  - {} [{}] code {} | {}",
            entry.label, entry.code_rome, entry.code, entry.short_label
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let days = args.days.max(1);
    let start = args
        .start
        .unwrap_or_else(|| Utc::now().date_naive() - Duration::days(i64::from(days) - 1));

    println!("JobTrackr gamification demo for {} ({} days)", args.user, days);
    println!("- Weekly goal set: {} applications", WEEKLY_GOAL_TARGET);
    let (service, activity) = in_memory_service();
    let summary = replay_job_hunt(
        &service,
        &activity,
        &UserId(args.user),
        start,
        days,
        report_step,
    )?;

    println!("\nFinal standing");
    println!("- Total points: {}", summary.total_points);
    if let Some(streak) = &summary.streak {
        println!(
            "- Streak: {} day(s) current | {} longest",
            streak.current_streak, streak.longest_streak
        );
    }
    println!("- Badges:");
    for earned in &summary.badges {
        println!(
            "  - {} (earned {})",
            earned.badge.label(),
            earned.earned_at.format("%Y-%m-%d")
        );
    }
    println!("- Goals:");
    for goal in &summary.goals {
        let status = if goal.completed {
            "completed"
        } else {
            "in progress"
        };
        println!(
            "  - {} {}/{} ({})",
            goal.id.0, goal.current, goal.target, status
        );
    }

    Ok(())
}

fn at_hour(day: NaiveDate, hour: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    day.and_time(time).and_utc()
}

/// One application per day, a CV on the first day and an interview every third day.
pub(crate) fn replay_job_hunt(
    service: &InMemoryService,
    activity: &InMemoryActivityRepository,
    user_id: &UserId,
    start: NaiveDate,
    days: u32,
    mut on_step: impl FnMut(NaiveDate, &str, &ActivityOutcome),
) -> Result<GamificationSummary, AppError> {
    service.create_goal(
        user_id,
        NewGoal {
            goal_type: GoalType::ApplicationsCount,
            period: GoalPeriod::Weekly,
            target: WEEKLY_GOAL_TARGET,
            end_date: None,
        },
        at_hour(start, 8),
    )?;

    for offset in 0..days {
        let day = start + Duration::days(i64::from(offset));
        let index = offset as usize;

        if offset == 0 {
            let uploaded_at = at_hour(day, 8);
            activity.add_document(DocumentRecord {
                id: format!("doc-{index}"),
                user_id: user_id.clone(),
                kind: DocumentKind::Cv,
                name: "cv.pdf".to_string(),
                created_at: uploaded_at,
            });
            on_step(
                day,
                "document uploaded",
                &service.record_activity(user_id, ActivityKind::DocumentUploaded, uploaded_at)?,
            );
        }

        let applied_at = at_hour(day, 9);
        activity.add_application(ApplicationRecord {
            id: format!("app-{index}"),
            user_id: user_id.clone(),
            company: COMPANIES[index % COMPANIES.len()].to_string(),
            position: "Développeur Full Stack".to_string(),
            status: ApplicationStatus::Applied,
            created_at: applied_at,
        });
        on_step(
            day,
            "application created",
            &service.record_activity(user_id, ActivityKind::ApplicationCreated, applied_at)?,
        );

        if offset % 3 == 2 {
            let scheduled_at = at_hour(day, 15);
            activity.add_interview(InterviewRecord {
                id: format!("itw-{index}"),
                user_id: user_id.clone(),
                application_id: format!("app-{index}"),
                scheduled_at: scheduled_at + Duration::days(2),
                created_at: scheduled_at,
            });
            on_step(
                day,
                "interview scheduled",
                &service.record_activity(user_id, ActivityKind::InterviewScheduled, scheduled_at)?,
            );
        }
    }

    Ok(service.summary(user_id)?)
}

fn report_step(day: NaiveDate, action: &str, outcome: &ActivityOutcome) {
    println!(
        "{} {}: +{} pts | streak {}",
        day, action, outcome.points_awarded, outcome.streak.current_streak
    );
    for badge in &outcome.new_badges {
        println!("  badge unlocked: {}", badge.label());
    }
    for goal_id in &outcome.completed_goals {
        println!("  goal completed: {}", goal_id.0);
    }
}
