use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::domain::WorkerId;
use super::period::YearMonth;
use super::records::WorkRecord;

/// Totals for one worker over one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyWork {
    pub days: u32,
    pub hours: f32,
    pub wages: u64,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

impl MonthlyWork {
    pub fn is_empty(&self) -> bool {
        self.days == 0
    }

    fn absorb(&mut self, record: &WorkRecord) {
        self.hours += record.work_hours;
        self.wages += record.daily_wage;
        self.first_day = Some(
            self.first_day
                .map_or(record.work_date, |day| day.min(record.work_date)),
        );
        self.last_day = Some(
            self.last_day
                .map_or(record.work_date, |day| day.max(record.work_date)),
        );
    }
}

/// Previous-month and current-month totals for a worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkHistory {
    pub worker_id: WorkerId,
    pub previous: MonthlyWork,
    pub current: MonthlyWork,
}

impl WorkHistory {
    pub fn empty(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            previous: MonthlyWork::default(),
            current: MonthlyWork::default(),
        }
    }

    /// Coverage starts on the first day worked in the evaluated month.
    pub fn suggested_acquisition_date(&self) -> Option<NaiveDate> {
        self.current.first_day
    }

    /// Coverage ends the day after the last day worked.
    pub fn suggested_loss_date(&self) -> Option<NaiveDate> {
        self.current
            .last_day
            .or(self.previous.last_day)
            .map(|day| day + Duration::days(1))
    }
}

/// Folds work records into per-worker [`WorkHistory`] for a reporting month.
#[derive(Debug, Clone, Copy)]
pub struct WorkHistoryAggregator {
    year_month: YearMonth,
}

impl WorkHistoryAggregator {
    pub fn new(year_month: YearMonth) -> Self {
        Self { year_month }
    }

    pub fn aggregate<'a, I>(&self, records: I) -> BTreeMap<WorkerId, WorkHistory>
    where
        I: IntoIterator<Item = &'a WorkRecord>,
    {
        let previous_month = self.year_month.previous();
        let mut histories: BTreeMap<WorkerId, WorkHistory> = BTreeMap::new();
        let mut seen_days: BTreeSet<(WorkerId, NaiveDate)> = BTreeSet::new();

        for record in records {
            let in_current = self.year_month.contains(record.work_date);
            let in_previous = previous_month.contains(record.work_date);
            if !in_current && !in_previous {
                continue;
            }

            let history = histories
                .entry(record.worker_id.clone())
                .or_insert_with(|| WorkHistory::empty(record.worker_id.clone()));
            let month = if in_current {
                &mut history.current
            } else {
                &mut history.previous
            };

            if seen_days.insert((record.worker_id.clone(), record.work_date)) {
                month.days += 1;
            }
            month.absorb(record);
        }

        histories
    }
}
