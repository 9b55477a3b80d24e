//! 边缘吸附模块
//!
//! 在像素空间中把移动元素的边缘对齐到兄弟元素的边缘。只用于移动操作，调整大小不吸附。

/// 像素空间中的一段水平区间
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelSpan {
    pub left: f64,
    pub width: f64,
}

impl PixelSpan {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    fn is_finite(&self) -> bool {
        self.left.is_finite() && self.width.is_finite()
    }
}

/// 参与比较的一对边缘，按检测优先级排列
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgePairing {
    /// 移动元素的左边缘对齐兄弟的右边缘
    LeftToRight,
    /// 移动元素的右边缘对齐兄弟的左边缘
    RightToLeft,
    LeftToLeft,
    RightToRight,
}

impl EdgePairing {
    pub const PRIORITY: [EdgePairing; 4] = [
        EdgePairing::LeftToRight,
        EdgePairing::RightToLeft,
        EdgePairing::LeftToLeft,
        EdgePairing::RightToRight,
    ];

    fn edges(self, projected: PixelSpan, sibling: PixelSpan) -> (f64, f64) {
        match self {
            EdgePairing::LeftToRight => (projected.left, sibling.right()),
            EdgePairing::RightToLeft => (projected.right(), sibling.left),
            EdgePairing::LeftToLeft => (projected.left, sibling.left),
            EdgePairing::RightToRight => (projected.right(), sibling.right()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapMatch {
    /// 命中兄弟在迭代顺序中的位置
    pub sibling_index: usize,
    pub pairing: EdgePairing,
    /// 吸附对原始增量做的修正（像素），绝对值不超过阈值
    pub correction: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapOutcome {
    pub delta: f64,
    pub snapped: Option<SnapMatch>,
}

impl SnapOutcome {
    fn unsnapped(delta: f64) -> Self {
        Self {
            delta,
            snapped: None,
        }
    }
}

/// 计算吸附后的像素增量
///
/// `moving` 是元素在手势起点的位置。按兄弟的迭代顺序、每个兄弟按 [`EdgePairing::PRIORITY`]
/// 依次检测，第一个距离不超过 `threshold` 的组合获胜（不是最近的那个）。
/// 没有命中时原样返回 `raw_delta`。
pub fn resolve_snap<I>(moving: PixelSpan, raw_delta: f64, threshold: f64, siblings: I) -> SnapOutcome
where
    I: IntoIterator<Item = PixelSpan>,
{
    if !threshold.is_finite() || threshold < 0.0 || !raw_delta.is_finite() || !moving.is_finite() {
        return SnapOutcome::unsnapped(raw_delta);
    }

    let projected = PixelSpan::new(moving.left + raw_delta, moving.width);

    for (sibling_index, sibling) in siblings.into_iter().enumerate() {
        if !sibling.is_finite() {
            continue;
        }
        for pairing in EdgePairing::PRIORITY {
            let (edge, target) = pairing.edges(projected, sibling);
            let distance = target - edge;
            if distance.abs() <= threshold {
                return SnapOutcome {
                    delta: raw_delta + distance,
                    snapped: Some(SnapMatch {
                        sibling_index,
                        pairing,
                        correction: distance,
                    }),
                };
            }
        }
    }

    SnapOutcome::unsnapped(raw_delta)
}
