//! The repeating daily batch timetable: divides a UTC day into evenly
//! spaced intervals and tells the caller which projects fire at each one.

use crate::catalogue::ProjectCatalogue;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use std::collections::BTreeSet;
use tracing::error;

const SECONDS_PER_DAY: i64 = 86_400;

/// One slice of the `lcm`-way division of a UTC day; `intervals[i]` holds
/// the project names that fire at the *end* of interval `i`.
pub type Batch = BTreeSet<String>;

#[derive(Debug, Clone)]
pub struct Schedule {
    lcm: u64,
    intervals: Vec<Batch>,
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}

impl Schedule {
    /// Builds the interval table from a catalogue, then verifies the
    /// invariants (every project fires exactly `syncs_per_day` times, every
    /// name in an interval exists in the catalogue). A verification failure
    /// is logged as an inconsistency, but the computed schedule is still
    /// returned and used so the service can keep running.
    pub fn build(catalogue: &ProjectCatalogue) -> Self {
        let lcm_value = catalogue
            .values()
            .map(|p| p.syncs_per_day as u64)
            .fold(1u64, lcm);

        let mut intervals = vec![Batch::new(); lcm_value as usize];
        for project in catalogue.values() {
            let freq = project.syncs_per_day as u64;
            let period = lcm_value / freq;
            let mut i = period;
            while i <= lcm_value {
                intervals[(i - 1) as usize].insert(project.name.clone());
                i += period;
            }
        }

        let schedule = Schedule {
            lcm: lcm_value,
            intervals,
        };

        if let Err(reason) = schedule.verify(catalogue) {
            error!("SCHEDULE_INCONSISTENT: {reason}; proceeding with computed schedule anyway");
        }

        schedule
    }

    fn verify(&self, catalogue: &ProjectCatalogue) -> Result<(), String> {
        if self.lcm == 0 {
            return Err("lcm must be >= 1".to_string());
        }
        if self.intervals.len() as u64 != self.lcm {
            return Err(format!(
                "interval count {} does not match lcm {}",
                self.intervals.len(),
                self.lcm
            ));
        }

        for project in catalogue.values() {
            let count = self
                .intervals
                .iter()
                .filter(|batch| batch.contains(&project.name))
                .count() as u32;
            if count != project.syncs_per_day {
                return Err(format!(
                    "project '{}' fires {count} times, expected {}",
                    project.name, project.syncs_per_day
                ));
            }
        }

        for batch in &self.intervals {
            for name in batch {
                if !catalogue.contains_key(name) {
                    return Err(format!("interval references unknown project '{name}'"));
                }
            }
        }

        Ok(())
    }

    pub fn lcm(&self) -> u64 {
        self.lcm
    }

    pub fn intervals(&self) -> &[Batch] {
        &self.intervals
    }

    fn interval_length(&self) -> Duration {
        Duration::seconds(SECONDS_PER_DAY / self.lcm as i64)
    }

    /// Returns the next `(fire_time, batch)` strictly after `now`. A
    /// `candidate == now` tie is treated as already past. If today's last
    /// interval has already fired, rolls over to interval 0 of the
    /// following day.
    pub fn get_next_sync_batch(&self, now: DateTime<Utc>) -> (DateTime<Utc>, Batch) {
        let midnight = Utc
            .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
            .single()
            .expect("valid calendar date");
        let interval_length = self.interval_length();

        let mut candidate = midnight + interval_length;
        for batch in &self.intervals {
            if candidate > now {
                return (candidate, batch.clone());
            }
            candidate += interval_length;
        }

        let tomorrow_midnight = midnight + Duration::days(1);
        (
            tomorrow_midnight + interval_length,
            self.intervals[0].clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::sync_details::{SyncDetails, SyncMethod};

    fn project(name: &str, syncs_per_day: u32) -> SyncDetails {
        SyncDetails {
            name: name.to_string(),
            syncs_per_day,
            sync_method: SyncMethod::Script,
            commands: vec![vec!["/bin/sh".into(), "-c".into(), "true".into()]],
            password_file: None,
        }
    }

    fn catalogue(projects: Vec<SyncDetails>) -> ProjectCatalogue {
        projects.into_iter().map(|p| (p.name.clone(), p)).collect()
    }

    #[test]
    fn single_project_four_syncs_per_day() {
        let catalogue = catalogue(vec![project("p", 4)]);
        let schedule = Schedule::build(&catalogue);

        assert_eq!(schedule.lcm(), 4);
        for batch in schedule.intervals() {
            assert_eq!(batch.len(), 1);
            assert!(batch.contains("p"));
        }
        assert_eq!(schedule.interval_length(), Duration::hours(6));
    }

    #[test]
    fn two_projects_two_and_three_syncs_per_day() {
        let catalogue = catalogue(vec![project("p2", 2), project("p3", 3)]);
        let schedule = Schedule::build(&catalogue);

        assert_eq!(schedule.lcm(), 6);
        assert_eq!(schedule.interval_length(), Duration::hours(4));

        let intervals = schedule.intervals();
        assert!(!intervals[0].contains("p2"));
        assert!(intervals[1].contains("p3"));
        assert!(intervals[2].contains("p2"));
        assert!(intervals[3].contains("p3"));
        assert!(!intervals[4].contains("p2"));
        assert!(!intervals[4].contains("p3"));
        assert!(intervals[5].contains("p2"));
        assert!(intervals[5].contains("p3"));
    }

    #[test]
    fn exact_firings_invariant_holds_for_mixed_frequencies() {
        let catalogue = catalogue(vec![
            project("a", 1),
            project("b", 2),
            project("c", 4),
            project("d", 8),
        ]);
        let schedule = Schedule::build(&catalogue);

        for project in catalogue.values() {
            let count = schedule
                .intervals()
                .iter()
                .filter(|b| b.contains(&project.name))
                .count() as u32;
            assert_eq!(count, project.syncs_per_day);
        }
    }

    #[test]
    fn lcm_is_minimal() {
        let catalogue = catalogue(vec![project("a", 4), project("b", 6)]);
        let schedule = Schedule::build(&catalogue);
        assert_eq!(schedule.lcm(), 12);
    }

    #[test]
    fn catalogue_closure_every_interval_name_exists() {
        let catalogue = catalogue(vec![project("a", 3), project("b", 1)]);
        let schedule = Schedule::build(&catalogue);
        for batch in schedule.intervals() {
            for name in batch {
                assert!(catalogue.contains_key(name));
            }
        }
    }

    #[test]
    fn get_next_sync_batch_returns_first_future_interval() {
        let catalogue = catalogue(vec![project("p", 4)]);
        let schedule = Schedule::build(&catalogue);

        let now = Utc.with_ymd_and_hms(2026, 7, 26, 5, 0, 0).unwrap();
        let (fire_time, batch) = schedule.get_next_sync_batch(now);
        assert_eq!(fire_time, Utc.with_ymd_and_hms(2026, 7, 26, 6, 0, 0).unwrap());
        assert!(batch.contains("p"));
    }

    #[test]
    fn get_next_sync_batch_rolls_over_past_midnight() {
        let catalogue = catalogue(vec![project("p", 4)]);
        let schedule = Schedule::build(&catalogue);

        let now = Utc.with_ymd_and_hms(2026, 7, 26, 23, 59, 59).unwrap();
        let (fire_time, batch) = schedule.get_next_sync_batch(now);
        assert_eq!(fire_time, Utc.with_ymd_and_hms(2026, 7, 27, 0, 0, 0).unwrap());
        assert!(batch.contains("p"));
    }

    #[test]
    fn get_next_sync_batch_treats_exact_tie_as_past() {
        let catalogue = catalogue(vec![project("p", 4)]);
        let schedule = Schedule::build(&catalogue);

        let now = Utc.with_ymd_and_hms(2026, 7, 26, 6, 0, 0).unwrap();
        let (fire_time, _) = schedule.get_next_sync_batch(now);
        assert_eq!(fire_time, Utc.with_ymd_and_hms(2026, 7, 26, 12, 0, 0).unwrap());
    }
}
