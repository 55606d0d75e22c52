use crate::metrics::InstanceStats;
use serde::Serialize;
use std::fmt;

const TIMEOUT_RATIO_LIMIT: f64 = 10.0;
const SLOW_EXECS_PER_SEC: f64 = 100.0;
const CYCLES_WO_FINDS_WARN: i64 = 10;
const CYCLES_WO_FINDS_MANY: i64 = 50;
const LOW_STABILITY: f64 = 80.0;

/// Health problem spotted in a single instance's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstanceWarning {
    HighTimeoutRatio { percent: f64 },
    NoExecutionData,
    SlowExecution { execs_per_sec: f64 },
    CyclesWithoutFinds { cycles: i64 },
    ManyCyclesWithoutFinds { cycles: i64 },
    LowStability { percent: f64 },
}

impl fmt::Display for InstanceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceWarning::HighTimeoutRatio { percent } => write!(f, "High timeout ratio: {percent:.1}%"),
            InstanceWarning::NoExecutionData => write!(f, "No execution data yet"),
            InstanceWarning::SlowExecution { execs_per_sec } => {
                write!(f, "Slow execution: {execs_per_sec:.1} execs/sec")
            }
            InstanceWarning::CyclesWithoutFinds { cycles } => write!(f, "Cycles without finds: {cycles}"),
            InstanceWarning::ManyCyclesWithoutFinds { cycles } => {
                write!(f, "Many cycles without finds: {cycles}")
            }
            InstanceWarning::LowStability { percent } => write!(f, "Low stability: {percent:.1}%"),
        }
    }
}

pub fn instance_warnings(stats: &InstanceStats) -> Vec<InstanceWarning> {
    let mut warnings = Vec::new();

    if let Some(percent) = stats.timeout_ratio() {
        if percent >= TIMEOUT_RATIO_LIMIT {
            warnings.push(InstanceWarning::HighTimeoutRatio { percent });
        }
    }

    if stats.execs_per_sec == 0.0 && stats.execs_done > 0 {
        warnings.push(InstanceWarning::NoExecutionData);
    } else if stats.execs_per_sec > 0.0 && stats.execs_per_sec < SLOW_EXECS_PER_SEC {
        warnings.push(InstanceWarning::SlowExecution {
            execs_per_sec: stats.execs_per_sec,
        });
    }

    let cycles = stats.cycles_wo_finds;
    if cycles > CYCLES_WO_FINDS_MANY {
        warnings.push(InstanceWarning::ManyCyclesWithoutFinds { cycles });
    } else if cycles > CYCLES_WO_FINDS_WARN {
        warnings.push(InstanceWarning::CyclesWithoutFinds { cycles });
    }

    // An instance that has not reported stability yet is not unstable.
    if stats.has_stability() && stats.stability < LOW_STABILITY {
        warnings.push(InstanceWarning::LowStability {
            percent: stats.stability,
        });
    }

    warnings
}
