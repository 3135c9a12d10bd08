//! The fixed weekly curriculum.
//!
//! A curriculum is an ordered, immutable sequence of [`Week`] records
//! numbered from 1. The built-in plan is generated from a table of segments;
//! a YAML file with the same shape can replace it.

use crate::error::{Result, StrideError};
use crate::types::{Category, Resource, Task, Week};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::path::Path;

pub const TOTAL_WEEKS: u32 = 175;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ---------------------------------------------------------------------------
// CurriculumSource
// ---------------------------------------------------------------------------

pub trait CurriculumSource: Send + Sync {
    /// All weeks, ordered by position.
    fn weeks(&self) -> &[Week];

    fn len(&self) -> u32 {
        self.weeks().len() as u32
    }

    fn is_empty(&self) -> bool {
        self.weeks().is_empty()
    }

    fn week(&self, number: u32) -> Option<&Week> {
        let index = number.checked_sub(1)? as usize;
        self.weeks().get(index)
    }
}

// ---------------------------------------------------------------------------
// Built-in plan
// ---------------------------------------------------------------------------

struct Template {
    text: &'static str,
    schedule: Option<&'static str>,
    link: Option<(&'static str, &'static str)>,
}

const fn t(text: &'static str) -> Template {
    Template {
        text,
        schedule: None,
        link: None,
    }
}

const fn ts(text: &'static str, schedule: &'static str) -> Template {
    Template {
        text,
        schedule: Some(schedule),
        link: None,
    }
}

const fn tl(
    text: &'static str,
    schedule: &'static str,
    url: &'static str,
    label: &'static str,
) -> Template {
    Template {
        text,
        schedule: Some(schedule),
        link: Some((url, label)),
    }
}

struct Segment {
    first: u32,
    last: u32,
    phase: &'static str,
    focus: &'static str,
    milestone: Option<&'static str>,
    japanese: &'static [Template],
    aiml: &'static [Template],
    college: &'static [Template],
    goals: &'static [Template],
    resources: &'static [(&'static str, &'static str)],
}

const SEGMENTS: &[Segment] = &[
    Segment {
        first: 1,
        last: 4,
        phase: "Foundations",
        focus: "Math Bootcamp + Hiragana/Katakana",
        milestone: None,
        japanese: &[
            tl("Anki review (15 min/day)", "Daily", "https://apps.ankiweb.net/", "Anki"),
            tl(
                "Hiragana practice (20 min/day)",
                "Daily",
                "https://www.tofugu.com/japanese/learn-hiragana/",
                "Tofugu",
            ),
            tl(
                "Duolingo Japanese (15 min/day)",
                "Daily",
                "https://www.duolingo.com/course/ja/en/Learn-Japanese",
                "Duolingo",
            ),
            t("Master 5 new Hiragana characters per day"),
            ts("Writing practice sheets", "Weekends"),
        ],
        aiml: &[
            ts("3Blue1Brown Linear Algebra", "Mon/Wed/Fri/Sun"),
            tl(
                "Khan Academy Math practice (30 min)",
                "Tue/Thu/Sat",
                "https://www.khanacademy.org/math/linear-algebra",
                "Khan Academy",
            ),
            ts("Python basics tutorial (30 min)", "Tue/Thu/Sat"),
            ts("Write 1 simple Python program", "Weekend"),
        ],
        college: &[
            ts("Attend college (3 days)", "Mon/Wed/Fri"),
            t("Complete all assignments on time"),
            t("Review lecture notes after each class"),
        ],
        goals: &[
            t("Learn 25 Hiragana characters"),
            t("Understand vectors and matrices"),
            t("Setup: Install Anki, Duolingo, Python (Anaconda)"),
            t("Write first Python program (Hello World + Calculator)"),
        ],
        resources: &[],
    },
    Segment {
        first: 5,
        last: 8,
        phase: "Foundations",
        focus: "Python Basics + Japanese Grammar Basics",
        milestone: None,
        japanese: &[
            tl("Anki review (15 min/day)", "Daily", "https://apps.ankiweb.net/", "Anki"),
            ts("Genki I Lesson study (25 min)", "Mon/Wed/Fri/Sun"),
            tl("Duolingo (15 min/day)", "Daily", "https://www.duolingo.com/", "Duolingo"),
            ts("Grammar exercises from Genki I", "Sat/Sun"),
            ts("Learn 50 new vocabulary words", "Weekly"),
            ts("Practice writing Katakana", "Daily 10 min"),
        ],
        aiml: &[
            ts("Python for Data Science course (45 min)", "Tue/Thu/Sat"),
            tl(
                "LeetCode Easy problems (2 per day)",
                "Mon/Wed/Fri",
                "https://leetcode.com/problemset/all/",
                "LeetCode",
            ),
            ts("Calculus review videos (30 min)", "Tue/Thu/Sun"),
            ts("Build 1 small Python project", "Weekend"),
        ],
        college: &[
            ts("College attendance (3 days)", "Mon/Wed/Fri"),
            t("Study for semester exams (1 hour daily)"),
            t("Complete assignments before deadline"),
            ts("Group project work", "Tue/Thu evenings"),
        ],
        goals: &[
            t("Complete Genki I Lessons 1-2"),
            t("Master Python control flow and functions"),
            t("Reach 200 vocabulary words total"),
            t("Solve 50 LeetCode Easy problems total"),
        ],
        resources: &[
            ("Tae Kim's Grammar Guide", "http://www.guidetojapanese.org/learn/grammar"),
            ("Python Documentation", "https://docs.python.org/3/tutorial/"),
        ],
    },
    Segment {
        first: 9,
        last: 12,
        phase: "Foundations",
        focus: "ML Introduction + Japanese Vocabulary Building",
        milestone: None,
        japanese: &[
            ts("Anki review (20 min/day)", "Daily - NEVER SKIP"),
            ts("Genki I study (30 min)", "Mon/Wed/Fri/Sat"),
            ts("Duolingo maintain streak", "Daily 15 min"),
            tl(
                "JapanesePod101 listening (15 min)",
                "Tue/Thu/Sun",
                "https://www.japanesepod101.com/",
                "JapanesePod101",
            ),
            t("Complete 1 Genki lesson per week"),
        ],
        aiml: &[
            tl(
                "Google ML Crash Course (1 hour)",
                "Tue/Thu/Sat",
                "https://developers.google.com/machine-learning/crash-course",
                "Google ML",
            ),
            ts("Probability & Statistics videos (30 min)", "Mon/Wed/Fri"),
            ts("Python practice problems", "Daily 20 min"),
            ts("First ML project: Linear Regression", "Weekend"),
        ],
        college: &[
            t("Maintain 8.0+ GPA (priority)"),
            ts("Active class participation", "College days"),
            t("Mid-semester exam preparation"),
        ],
        goals: &[
            t("Reach 450 vocabulary words total"),
            t("Understand ML fundamentals (supervised/unsupervised)"),
            t("Build working Linear Regression model"),
        ],
        resources: &[],
    },
    Segment {
        first: 13,
        last: 24,
        phase: "Foundations",
        focus: "Andrew Ng ML Course + Complete Genki I",
        milestone: Some("Foundation Phase Complete!"),
        japanese: &[
            ts("Anki review (20 min/day)", "Daily"),
            ts("Genki I study (35 min)", "Mon/Wed/Fri/Sat"),
            ts("Duolingo", "Daily 15 min"),
            ts("Japanese immersion (anime/YouTube)", "Daily 30 min"),
        ],
        aiml: &[
            tl(
                "Andrew Ng ML Course",
                "Tue/Thu/Sat",
                "https://www.coursera.org/learn/machine-learning",
                "Coursera",
            ),
            ts("NumPy/Pandas tutorials", "Mon/Wed/Fri"),
            ts("Build ML project", "Weekend"),
        ],
        college: &[
            ts("College", "Mon/Wed/Fri"),
            t("Semester project work"),
            t("Aim for 8.5+ GPA this semester"),
        ],
        goals: &[
            t("Andrew Ng course progress"),
            t("Upload projects to GitHub with a proper README"),
        ],
        resources: &[],
    },
    Segment {
        first: 25,
        last: 32,
        phase: "Core Building",
        focus: "Deep Learning + JLPT N5",
        milestone: Some("First JLPT certificate!"),
        japanese: &[
            ts("Anki review (20 min/day)", "Daily - NO EXCEPTIONS"),
            ts("Genki II intensive study (1 hour)", "Daily"),
            tl("Listening practice (30 min)", "Daily", "https://www.nhk.or.jp/lesson/", "NHK"),
            t("JLPT N5 practice tests"),
        ],
        aiml: &[
            tl(
                "fast.ai Practical Deep Learning lesson",
                "Daily 2 hours",
                "https://course.fast.ai/",
                "fast.ai",
            ),
            t("Build image classifier project"),
            t("Daily GitHub contributions"),
        ],
        college: &[
            t("SUMMER BREAK - No classes!"),
            t("Use this time for intensive learning (6-8 hours/day)"),
        ],
        goals: &[t("Deep Learning project built"), t("JLPT N5 practice score: 70%+")],
        resources: &[],
    },
    Segment {
        first: 33,
        last: 52,
        phase: "Core Building",
        focus: "Advanced Projects + JLPT N4 + TOEFL",
        milestone: Some("Year 1 Complete! JLPT N4 + TOEFL achieved!"),
        japanese: &[
            ts("Anki review (20 min/day)", "Daily"),
            ts("JLPT N4 preparation / Intermediate textbook", "Mon-Sat"),
            ts("Listening: Japanese podcasts", "Daily 30 min"),
        ],
        aiml: &[
            ts("Real-world project development", "Mon-Sat 1.5 hours"),
            tl("Kaggle competition", "Weekly", "https://www.kaggle.com/", "Kaggle"),
            t("Blog post / Paper reading"),
        ],
        college: &[
            ts("College", "Mon/Wed/Fri"),
            t("Strong GPA focus"),
            t("All assignments on time"),
        ],
        goals: &[
            t("N4 practice score: 80%+"),
            t("TOEFL practice test every weekend"),
            t("Strong semester finish"),
        ],
        resources: &[],
    },
    Segment {
        first: 53,
        last: 104,
        phase: "Advanced Building",
        focus: "Undergraduate Research + JLPT N3",
        milestone: Some("Year 2 Complete! JLPT N3 + Research Experience!"),
        japanese: &[
            ts("Daily Anki (20 min)", "NEVER stop"),
            ts("Intermediate textbook (Tobira/Quartet)", "45 min daily"),
            tl(
                "NHK Easy News reading",
                "Daily 20 min",
                "https://www3.nhk.or.jp/news/easy/",
                "NHK Easy",
            ),
            t("Kanji study: Target 650+ for N3"),
        ],
        aiml: &[
            ts("Undergraduate research work", "6+ hours/week"),
            t("Advanced projects in specialization"),
            t("Research paper writing / reading"),
            t("Professor collaboration"),
        ],
        college: &[
            t("Semester coursework"),
            t("Strong GPA maintenance (8.5+)"),
            t("Final year project"),
        ],
        goals: &[
            t("Research progress / Paper submission"),
            t("N3 preparation ongoing"),
        ],
        resources: &[
            ("arXiv Preprints", "https://arxiv.org/"),
            ("Semantic Scholar", "https://www.semanticscholar.org/"),
        ],
    },
    Segment {
        first: 105,
        last: 125,
        phase: "Applications",
        focus: "Professor Contact + MEXT Application",
        milestone: Some("BTech Graduation + MEXT Application Submitted!"),
        japanese: &[
            t("N3 level maintenance (30 min/day)"),
            t("Conversational practice"),
        ],
        aiml: &[
            t("Contact prospective professors"),
            t("Draft research plan"),
        ],
        college: &[t("Final semester coursework"), t("Graduation project")],
        goals: &[
            t("MEXT application documents"),
            t("Recommendation letters"),
        ],
        resources: &[
            ("Study in Japan", "https://www.studyinjapan.go.jp/en/"),
            ("MEXT Official", "https://www.mext.go.jp/en/"),
        ],
    },
    Segment {
        first: 126,
        last: 175,
        phase: "Final Preparation",
        focus: "Visa Processing + Japan Preparation",
        milestone: Some("DEPART FOR JAPAN!"),
        japanese: &[
            t("Japanese language maintenance"),
            t("Survival Japanese practice"),
            t("Connect with Japanese students online"),
        ],
        aiml: &[
            t("Research current trends in your field"),
            t("Review professor's recent publications"),
        ],
        college: &[],
        goals: &[
            t("Financial preparation"),
            t("Research accommodation options"),
            t("Cultural research about Japan"),
        ],
        resources: &[],
    },
];

/// The generated 175-week plan.
pub struct BuiltinCurriculum {
    weeks: Vec<Week>,
}

impl BuiltinCurriculum {
    pub fn new(start: NaiveDate) -> Self {
        let weeks = SEGMENTS
            .iter()
            .flat_map(|seg| (seg.first..=seg.last).map(move |n| build_week(seg, n, start)))
            .collect();
        Self { weeks }
    }
}

impl Default for BuiltinCurriculum {
    fn default() -> Self {
        Self::new(default_start())
    }
}

impl CurriculumSource for BuiltinCurriculum {
    fn weeks(&self) -> &[Week] {
        &self.weeks
    }
}

pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 1).unwrap_or_default()
}

fn build_week(seg: &Segment, number: u32, start: NaiveDate) -> Week {
    let first_day = start + Duration::days(7 * (i64::from(number) - 1));
    let last_day = first_day + Duration::days(6);

    let tasks = |category: Category, templates: &[Template]| -> Vec<Task> {
        templates
            .iter()
            .enumerate()
            .map(|(i, tpl)| {
                let id = format!("w{number}-{}-{}", category.id_prefix(), i + 1);
                let mut task = Task::new(id, tpl.text);
                task.schedule = tpl.schedule.map(str::to_string);
                if let Some((url, label)) = tpl.link {
                    task = task.with_link(url, label);
                }
                task
            })
            .collect()
    };

    Week {
        week_number: number,
        start_date: format_day(first_day),
        end_date: format_day(last_day),
        month: month_name(first_day).to_string(),
        year: first_day.year(),
        phase: seg.phase.to_string(),
        focus: seg.focus.to_string(),
        japanese: tasks(Category::Japanese, seg.japanese),
        aiml: tasks(Category::Aiml, seg.aiml),
        college: tasks(Category::College, seg.college),
        goals: tasks(Category::Goals, seg.goals),
        milestone: seg
            .milestone
            .filter(|_| number == seg.last)
            .map(str::to_string),
        resources: seg
            .resources
            .iter()
            .map(|(title, url)| Resource {
                title: title.to_string(),
                url: url.to_string(),
            })
            .collect(),
    }
}

fn month_name(day: NaiveDate) -> &'static str {
    MONTHS[day.month0() as usize]
}

fn format_day(day: NaiveDate) -> String {
    format!("{} {}", day.day(), month_name(day))
}

// ---------------------------------------------------------------------------
// File-backed plan
// ---------------------------------------------------------------------------

/// A curriculum loaded from a YAML list of weeks.
pub struct FileCurriculum {
    weeks: Vec<Week>,
}

impl FileCurriculum {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut weeks: Vec<Week> = serde_yaml::from_str(&data)?;
        if weeks.is_empty() {
            return Err(StrideError::EmptyCurriculum);
        }
        weeks.sort_by_key(|w| w.week_number);
        // Positions are authoritative; renumber so week(n) stays an index.
        for (i, week) in weeks.iter_mut().enumerate() {
            week.week_number = i as u32 + 1;
        }
        Ok(Self { weeks })
    }
}

impl CurriculumSource for FileCurriculum {
    fn weeks(&self) -> &[Week] {
        &self.weeks
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct WeekSummary {
    pub week_number: u32,
    pub month: String,
    pub year: i32,
    pub focus: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseGroup {
    pub phase: String,
    pub weeks: Vec<WeekSummary>,
}

/// Weeks whose number, month or focus contains `query`, grouped by phase in
/// curriculum order. Empty groups are dropped; an empty query matches all.
pub fn search(source: &dyn CurriculumSource, query: &str) -> Vec<PhaseGroup> {
    let needle = query.trim().to_lowercase();
    let mut groups: Vec<PhaseGroup> = Vec::new();

    for week in source.weeks() {
        let hit = week.week_number.to_string().contains(&needle)
            || week.month.to_lowercase().contains(&needle)
            || week.focus.to_lowercase().contains(&needle);
        if !hit {
            continue;
        }
        let summary = WeekSummary {
            week_number: week.week_number,
            month: week.month.clone(),
            year: week.year,
            focus: week.focus.clone(),
        };
        match groups.iter_mut().find(|g| g.phase == week.phase) {
            Some(group) => group.weeks.push(summary),
            None => groups.push(PhaseGroup {
                phase: week.phase.clone(),
                weeks: vec![summary],
            }),
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Journey milestones
// ---------------------------------------------------------------------------

const JOURNEY: &[(u32, &str)] = &[
    (10, "Week 10"),
    (24, "Genki I Complete"),
    (32, "JLPT N5"),
    (52, "Year 1 Complete"),
    (104, "JLPT N3"),
    (175, "Depart for Japan!"),
];

/// Weeks before a milestone during which it counts as upcoming.
const UPCOMING_WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Reached,
    Upcoming,
    Future,
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyMilestone {
    pub week: u32,
    pub label: &'static str,
    pub status: MilestoneStatus,
}

pub fn journey_milestones(current_week: u32) -> Vec<JourneyMilestone> {
    JOURNEY
        .iter()
        .map(|&(week, label)| {
            let status = if current_week >= week {
                MilestoneStatus::Reached
            } else if current_week + UPCOMING_WINDOW >= week {
                MilestoneStatus::Upcoming
            } else {
                MilestoneStatus::Future
            };
            JourneyMilestone {
                week,
                label,
                status,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_has_contiguous_weeks() {
        let c = BuiltinCurriculum::default();
        assert_eq!(c.len(), TOTAL_WEEKS);
        for (i, week) in c.weeks().iter().enumerate() {
            assert_eq!(week.week_number, i as u32 + 1);
        }
        assert!(c.week(0).is_none());
        assert!(c.week(TOTAL_WEEKS + 1).is_none());
    }

    #[test]
    fn builtin_dates_advance_weekly() {
        let c = BuiltinCurriculum::default();
        let w1 = c.week(1).unwrap();
        assert_eq!(w1.start_date, "1 December");
        assert_eq!(w1.end_date, "7 December");
        assert_eq!(w1.year, 2024);
        let w5 = c.week(5).unwrap();
        assert_eq!(w5.start_date, "29 December");
        assert_eq!(w5.month, "December");
        let w6 = c.week(6).unwrap();
        assert_eq!(w6.month, "January");
        assert_eq!(w6.year, 2025);
    }

    #[test]
    fn task_ids_are_unique_and_stable() {
        let c = BuiltinCurriculum::default();
        let w1 = c.week(1).unwrap();
        assert_eq!(w1.japanese[0].id, "w1-jp-1");
        assert_eq!(w1.goals[3].id, "w1-goal-4");

        let mut ids: Vec<&str> = c
            .weeks()
            .iter()
            .flat_map(|w| w.all_tasks().map(|t| t.id.as_str()))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn milestone_only_on_last_week_of_segment() {
        let c = BuiltinCurriculum::default();
        assert_eq!(
            c.week(24).unwrap().milestone.as_deref(),
            Some("Foundation Phase Complete!")
        );
        assert!(c.week(23).unwrap().milestone.is_none());
        assert!(c.week(175).unwrap().milestone.is_some());
    }

    #[test]
    fn search_groups_by_phase() {
        let c = BuiltinCurriculum::default();
        let groups = search(&c, "n3");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].phase, "Advanced Building");

        let all = search(&c, "");
        let count: usize = all.iter().map(|g| g.weeks.len()).sum();
        assert_eq!(count, TOTAL_WEEKS as usize);
        assert_eq!(all[0].phase, "Foundations");
    }

    #[test]
    fn search_matches_month_case_insensitively() {
        let c = BuiltinCurriculum::default();
        let groups = search(&c, "FEBRUARY");
        assert!(groups
            .iter()
            .flat_map(|g| &g.weeks)
            .all(|w| w.month == "February"));
        assert!(!groups.is_empty());
    }

    #[test]
    fn milestone_statuses() {
        let ms = journey_milestones(27);
        let by_week = |w: u32| ms.iter().find(|m| m.week == w).unwrap().status;
        assert_eq!(by_week(10), MilestoneStatus::Reached);
        assert_eq!(by_week(24), MilestoneStatus::Reached);
        assert_eq!(by_week(32), MilestoneStatus::Upcoming);
        assert_eq!(by_week(52), MilestoneStatus::Future);
    }

    #[test]
    fn file_curriculum_renumbers_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(
            &path,
            r#"
- weekNumber: 7
  startDate: 8 Jan
  endDate: 14 Jan
  month: January
  year: 2030
  phase: Late
  focus: second
- weekNumber: 2
  startDate: 1 Jan
  endDate: 7 Jan
  month: January
  year: 2030
  phase: Early
  focus: first
  japanese:
    - id: a-1
      text: Read a chapter
"#,
        )
        .unwrap();
        let c = FileCurriculum::load(&path).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.week(1).unwrap().focus, "first");
        assert_eq!(c.week(1).unwrap().japanese[0].id, "a-1");
        assert_eq!(c.week(2).unwrap().week_number, 2);
    }

    #[test]
    fn empty_file_curriculum_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            FileCurriculum::load(&path),
            Err(StrideError::EmptyCurriculum)
        ));
    }
}
