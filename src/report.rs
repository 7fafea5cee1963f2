use std::fmt;

use crate::catalog::SkillCatalog;
use crate::optimizer::allocation::SPAllocation;
use crate::optimizer::{AttributeMapping, OptimizationResult};
use crate::utils::ImplantGrade;

const ROMAN_NUMERAL_LEVELS: [&str; 6] = ["", "I", "II", "III", "IV", "V"];

/// Formats seconds as `"1d 2h 3m 4s"`, leaving out zero units.
///
/// Without `show_all_figures` only the two most significant units are kept:
/// days keep hours (or minutes when there are no hours) and hours keep minutes,
/// each rounded by the unit that was dropped.
pub fn format_duration(seconds: f64, show_all_figures: bool) -> String {
    let seconds = seconds.max(0.0);
    let mut d = (seconds / 86400.0).floor() as i64;
    let mut h = ((seconds % 86400.0) / 3600.0).floor() as i64;
    let mut m = ((seconds % 3600.0) / 60.0).floor() as i64;
    let mut s = seconds % 60.0;

    if !show_all_figures {
        if d != 0 {
            if h == 0 {
                s = 0.0;
            } else {
                if m > 30 {
                    h += 1;
                    if h == 24 {
                        d += 1;
                        h = 0;
                    }
                }
                m = 0;
                s = 0.0;
            }
        } else if h != 0 {
            if s > 30.0 {
                m += 1;
                if m == 60 {
                    h += 1;
                    m = 0;
                    if h == 24 {
                        d += 1;
                        h = 0;
                    }
                }
            }
            s = 0.0;
        }
    }

    let parts: Vec<String> = [(d, "d"), (h, "h"), (m, "m"), (s as i64, "s")]
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// SP with thousands separators.
pub fn format_sp(sp: i64) -> String {
    let digits = sp.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if sp < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn roman_numeral(level: i64) -> String {
    usize::try_from(level)
        .ok()
        .and_then(|idx| ROMAN_NUMERAL_LEVELS.get(idx))
        .map(|numeral| numeral.to_string())
        .unwrap_or_else(|| level.to_string())
}

/// Text rendering of an optimization result.
pub struct Report<'a, C: ?Sized> {
    result: &'a OptimizationResult,
    catalog: &'a C,
    character_name: Option<&'a str>,
}

impl<'a, C: SkillCatalog + ?Sized> Report<'a, C> {
    pub fn new(result: &'a OptimizationResult, catalog: &'a C) -> Self {
        Self {
            result,
            catalog,
            character_name: None,
        }
    }

    pub fn with_character_name(mut self, name: Option<&'a str>) -> Self {
        self.character_name = name;
        self
    }

    fn write_mapping(
        f: &mut fmt::Formatter<'_>,
        label: &str,
        mapping: &AttributeMapping,
    ) -> fmt::Result {
        writeln!(f, "{}", label)?;
        writeln!(f, "  {}", mapping.attributes)?;
        writeln!(
            f,
            "  {:<15}{:<15}{:<15}{}",
            "Implant Bonus",
            "Time Taken",
            "Improvement",
            "Total Savings"
        )?;

        let durations = &mapping.duration_per_implant_grade;
        for implant in ImplantGrade::ALL {
            let grade = implant.grade() as usize;
            let duration = durations[grade];
            let (improvement, total) = if grade == 0 {
                ("-".to_string(), "-".to_string())
            } else {
                (
                    format_duration(durations[grade - 1] - duration, false),
                    format_duration(durations[0] - duration, false),
                )
            };
            writeln!(
                f,
                "  {:<15}{:<15}{:<15}{}",
                format!("+{}", grade),
                format_duration(duration, false),
                improvement,
                total
            )?;
        }
        Ok(())
    }

    fn write_allocations(
        &self,
        f: &mut fmt::Formatter<'_>,
        allocations: &[SPAllocation],
    ) -> fmt::Result {
        writeln!(f, "{:<40}{}", "Skill", "SP Allocated")?;
        for allocation in allocations {
            let name = self
                .catalog
                .skill(allocation.skill_id)
                .map(|skill| skill.name.clone())
                .unwrap_or_else(|| format!("Skill {}", allocation.skill_id));
            writeln!(
                f,
                "{:<40}{}",
                format!("{} {}", name, roman_numeral(allocation.level)),
                format_sp(allocation.sp)
            )?;
        }
        Ok(())
    }
}

impl<'a, C: SkillCatalog + ?Sized> fmt::Display for Report<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;

        if let Some(name) = self.character_name {
            writeln!(f, "{}", name)?;
            writeln!(f)?;
        }

        if result.is_optimized() {
            writeln!(f, "Your mapping is optimized.")?;
            writeln!(f)?;
            Self::write_mapping(f, "Optimized (Current) Mapping", &result.current)?;
        } else {
            let savings = format_duration(result.savings(), false);
            writeln!(f, "Saves at least {}", savings)?;
            writeln!(f)?;
            Self::write_mapping(f, "Optimized Mapping", &result.best)?;
            writeln!(f)?;
            Self::write_mapping(f, "Previous Mapping", &result.current)?;
        }

        if !result.best_allocation.is_empty() {
            writeln!(f)?;
            self.write_allocations(f, &result.best_allocation)?;
        }

        Ok(())
    }
}
