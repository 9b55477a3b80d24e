//! 刻度规划模块
//!
//! 根据当前的像素密度选择主/次刻度间隔，并生成刻度位置。只做计算，不负责绘制和标签格式。

/// 主刻度候选间隔（毫秒），从小到大
pub const MAJOR_INTERVAL_CANDIDATES: [i64; 13] = [
    100, 200, 500, 1_000, 2_000, 5_000, 10_000, 15_000, 30_000, 60_000, 120_000, 300_000, 600_000,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickSpacing {
    pub min_major_px: f64,
    pub min_minor_px: f64,
}

impl Default for TickSpacing {
    fn default() -> Self {
        Self {
            min_major_px: 80.0,
            min_minor_px: 8.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickKind {
    Major,
    Minor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub time: i64,
    pub kind: TickKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickPlan {
    pub major_interval: i64,
    pub minor_interval: i64,
    /// 按时间排序，同一时间只有一个刻度
    pub ticks: Vec<Tick>,
}

/// 选择间隔并生成 `[0, total_duration]` 内的全部刻度
///
/// 最后一个刻度总是恰好落在 `total_duration` 上，即使它不在间隔边界上。
/// 刻度数量随总时长线性增长，很长的时间轴每帧绘制时应使用 [`plan_ticks_between`]。
pub fn plan_ticks<F>(time_to_pixels: F, total_duration: i64, spacing: TickSpacing) -> TickPlan
where
    F: Fn(i64) -> f64,
{
    plan_ticks_between(time_to_pixels, total_duration, 0, total_duration, spacing)
}

/// 与 [`plan_ticks`] 相同的间隔，但只生成 `[visible_start, visible_end]` 内的刻度
///
/// 末尾的 `total_duration` 刻度只在它落在可见范围内时出现。
pub fn plan_ticks_between<F>(
    time_to_pixels: F,
    total_duration: i64,
    visible_start: i64,
    visible_end: i64,
    spacing: TickSpacing,
) -> TickPlan
where
    F: Fn(i64) -> f64,
{
    let (major_interval, minor_interval) = choose_intervals(&time_to_pixels, spacing);
    let total = total_duration.max(0);
    let from = visible_start.clamp(0, total);
    let to = visible_end.clamp(0, total);

    let mut ticks = Vec::new();
    if from <= to {
        // 第一个不早于 `from` 的次刻度
        let remainder = from % minor_interval;
        let mut time = if remainder == 0 { from } else { from - remainder + minor_interval };
        while time <= to {
            let kind = if time % major_interval == 0 {
                TickKind::Major
            } else {
                TickKind::Minor
            };
            ticks.push(Tick { time, kind });
            match time.checked_add(minor_interval) {
                Some(next) => time = next,
                None => break,
            }
        }

        if to == total {
            match ticks.last_mut() {
                Some(last) if last.time == total => last.kind = TickKind::Major,
                _ => ticks.push(Tick {
                    time: total,
                    kind: TickKind::Major,
                }),
            }
        }
    }

    TickPlan {
        major_interval,
        minor_interval,
        ticks,
    }
}

fn choose_intervals<F>(time_to_pixels: &F, spacing: TickSpacing) -> (i64, i64)
where
    F: Fn(i64) -> f64,
{
    let major = MAJOR_INTERVAL_CANDIDATES
        .iter()
        .copied()
        .find(|&interval| time_to_pixels(interval) >= spacing.min_major_px)
        .unwrap_or(MAJOR_INTERVAL_CANDIDATES[MAJOR_INTERVAL_CANDIDATES.len() - 1]);

    // 每个主刻度 10 个次刻度，太密时退到 5 个、2 个，最后不画次刻度
    let minor = [major / 10, major / 5, major / 2]
        .into_iter()
        .find(|&interval| time_to_pixels(interval) >= spacing.min_minor_px)
        .unwrap_or(major);

    (major, minor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::TimeScale;

    fn plan(zoom: f64, total: i64) -> TickPlan {
        let scale = TimeScale::new(zoom, 100.0).unwrap();
        plan_ticks(|t| scale.time_to_pixels(t), total, TickSpacing::default())
    }

    #[test]
    fn picks_smallest_interval_meeting_major_spacing() {
        // 100 px/s: 500 ms is 50 px, 1 s is 100 px
        let p = plan(1.0, 10_000);
        assert_eq!(p.major_interval, 1_000);
        assert_eq!(p.minor_interval, 100);

        // 1000 px/s: 100 ms is 100 px
        assert_eq!(plan(10.0, 1_000).major_interval, 100);
        // 5 px/s: 30 s is 150 px, 15 s is 75 px
        assert_eq!(plan(0.05, 60_000).major_interval, 30_000);
    }

    #[test]
    fn minor_interval_backs_off_when_too_dense() {
        // 0.1 zoom -> 10 px/s, major 10 s (100 px); 1 s minor is 10 px -> keeps /10
        let p = plan(0.1, 30_000);
        assert_eq!((p.major_interval, p.minor_interval), (10_000, 1_000));

        // tighter minimum forces /5 then /2
        let scale = TimeScale::new(1.0, 100.0).unwrap();
        let spacing = TickSpacing {
            min_major_px: 80.0,
            min_minor_px: 15.0,
        };
        let p = plan_ticks(|t| scale.time_to_pixels(t), 2_000, spacing);
        assert_eq!((p.major_interval, p.minor_interval), (1_000, 200));

        let spacing = TickSpacing {
            min_major_px: 80.0,
            min_minor_px: 40.0,
        };
        let p = plan_ticks(|t| scale.time_to_pixels(t), 2_000, spacing);
        assert_eq!((p.major_interval, p.minor_interval), (1_000, 500));

        let spacing = TickSpacing {
            min_major_px: 80.0,
            min_minor_px: 90.0,
        };
        let p = plan_ticks(|t| scale.time_to_pixels(t), 2_000, spacing);
        assert_eq!((p.major_interval, p.minor_interval), (1_000, 1_000));
    }

    #[test]
    fn falls_back_to_largest_candidate_when_zoomed_far_out() {
        let scale = TimeScale::new(0.0001, 100.0).unwrap();
        let p = plan_ticks(|t| scale.time_to_pixels(t), 3_600_000, TickSpacing::default());
        assert_eq!(p.major_interval, 600_000);
    }

    #[test]
    fn final_tick_lands_exactly_on_total_duration() {
        let p = plan(1.0, 2_350);
        let last = p.ticks.last().unwrap();
        assert_eq!(last.time, 2_350);
        assert_eq!(last.kind, TickKind::Major);
        assert!(p.ticks.iter().all(|t| t.time <= 2_350));

        let majors: Vec<i64> = p
            .ticks
            .iter()
            .filter(|t| t.kind == TickKind::Major)
            .map(|t| t.time)
            .collect();
        assert_eq!(majors, vec![0, 1_000, 2_000, 2_350]);
    }

    #[test]
    fn boundary_total_is_not_duplicated() {
        let p = plan(1.0, 2_000);
        let at_end = p.ticks.iter().filter(|t| t.time == 2_000).count();
        assert_eq!(at_end, 1);
        assert_eq!(p.ticks.len(), 21);
    }

    #[test]
    fn ticks_are_sorted_and_unique() {
        let p = plan(0.37, 47_123);
        assert!(p.ticks.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn zero_duration_has_single_tick() {
        let p = plan(1.0, 0);
        assert_eq!(
            p.ticks,
            vec![Tick {
                time: 0,
                kind: TickKind::Major
            }]
        );
    }

    #[test]
    fn visible_window_limits_tick_count() {
        // ten hours at zoom 20: 100 ms majors, 10 ms minors
        let scale = TimeScale::new(20.0, 100.0).unwrap();
        let total = 36_000_000;
        let p = plan_ticks_between(|t| scale.time_to_pixels(t), total, 0, scale.pixels_to_time(1000.0), TickSpacing::default());
        assert_eq!((p.major_interval, p.minor_interval), (100, 10));
        assert_eq!(p.ticks.len(), 51);
        assert_eq!(p.ticks.last().map(|t| t.time), Some(500));
    }

    #[test]
    fn visible_window_starts_on_interval_boundary() {
        let scale = TimeScale::new(1.0, 100.0).unwrap();
        let p = plan_ticks_between(|t| scale.time_to_pixels(t), 2_350, 1_450, 10_000, TickSpacing::default());
        let times: Vec<i64> = p.ticks.iter().map(|t| t.time).collect();
        assert_eq!(times.first(), Some(&1_500));
        assert_eq!(times.len(), 10);
        let majors: Vec<i64> = p.ticks.iter().filter(|t| t.kind == TickKind::Major).map(|t| t.time).collect();
        assert_eq!(majors, vec![2_000, 2_350]);

        // window ending before the total has no closing tick
        let p = plan_ticks_between(|t| scale.time_to_pixels(t), 2_350, -500, 450, TickSpacing::default());
        let times: Vec<i64> = p.ticks.iter().map(|t| t.time).collect();
        assert_eq!(times, vec![0, 100, 200, 300, 400]);
    }
}
