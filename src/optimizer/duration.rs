use crate::attributes::Attributes;
use crate::skill_queue::SkillQueueItem;
use crate::utils::{self, ImplantGrade};

/// Running total of training seconds, yielded once per queue item.
///
/// Holds nothing but borrowed inputs and the sum so far, so building a new one
/// from the same arguments reproduces the same sequence.
#[derive(Debug, Clone)]
pub struct QueueDurations<'a> {
    items: std::slice::Iter<'a, SkillQueueItem>,
    credits: &'a [i64],
    position: usize,
    attributes: Attributes,
    implant_bonus: f64,
    duration: f64,
}

pub fn queue_durations<'a>(
    items: &'a [SkillQueueItem],
    attributes: &Attributes,
    implant: ImplantGrade,
) -> QueueDurations<'a> {
    QueueDurations {
        items: items.iter(),
        credits: &[],
        position: 0,
        attributes: *attributes,
        implant_bonus: implant.bonus(),
        duration: 0.0,
    }
}

impl<'a> QueueDurations<'a> {
    /// Pre-applies SP credit per queue position; positions past the end get none.
    pub fn with_credits(mut self, credits: &'a [i64]) -> Self {
        self.credits = credits;
        self
    }
}

impl Iterator for QueueDurations<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let item = self.items.next()?;
        let credit = self.credits.get(self.position).copied().unwrap_or(0);
        self.position += 1;

        let sp_to_finish = (item.sp_to_finish - credit).max(0);
        let sp_per_minute =
            utils::training_rate_per_minute(&self.attributes, item.attribute) + self.implant_bonus;
        let sp_per_second = sp_per_minute / 60.0;
        self.duration += sp_to_finish as f64 / sp_per_second;
        Some(self.duration)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

pub fn calculate_queue_duration(
    items: &[SkillQueueItem],
    attributes: &Attributes,
    implant: ImplantGrade,
) -> f64 {
    queue_durations(items, attributes, implant)
        .last()
        .unwrap_or(0.0)
}

/// Consumes a running-total sequence, giving up as soon as it passes `bound`.
/// A queue that finishes within the bound returns its total.
pub fn bounded_total(durations: impl Iterator<Item = f64>, bound: f64) -> Option<f64> {
    let mut total = 0.0;
    for duration in durations {
        if duration > bound {
            return None;
        }
        total = duration;
    }
    Some(total)
}
