//! 静态 2-d k-d 树.
//!
//! 一次构建, 只读查询. 树必须由调用方显式传递到每个查询点,
//! 不存在隐藏的全局共享索引.

use crate::Pos2d;
use binary_heap_plus::{BinaryHeap, FnComparator};
use std::cmp::Ordering;

/// `(点索引, 距离平方)`. 堆内以距离平方比较, 对外输出欧氏距离.
type HeapEntry = (usize, f64);

type DistCmp = fn(&HeapEntry, &HeapEntry) -> Ordering;

/// 以距离平方为序的大顶堆, 维护当前最优的 k 个候选.
type DistHeap = BinaryHeap<HeapEntry, FnComparator<DistCmp>>;

fn by_dist2(a: &HeapEntry, b: &HeapEntry) -> Ordering {
    // 坐标要求有限, 距离平方不会是 NaN.
    a.1.partial_cmp(&b.1).unwrap()
}

/// 二维点集上的静态 k-d 树 (轴向交替中位数划分).
///
/// # 注意
///
/// 所有坐标必须是有限浮点数, 否则程序 panic.
#[derive(Debug, Clone)]
pub struct KdTree2 {
    points: Vec<Pos2d>,
    /// 树序索引排列: 子区间的中位位置即子树根.
    order: Vec<usize>,
}

impl KdTree2 {
    /// 对 `points` 构建索引. 点集为空时得到空树.
    pub fn build(points: &[Pos2d]) -> Self {
        assert!(
            points.iter().all(|p| p.0.is_finite() && p.1.is_finite()),
            "k-d 树要求所有坐标有限"
        );

        let mut order: Vec<usize> = (0..points.len()).collect();
        build_rec(points, &mut order, 0);
        Self {
            points: points.to_vec(),
            order,
        }
    }

    /// 索引覆盖的点数.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 树是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// "查无此点" 哨兵索引, 等于点数. k 近邻结果不足 k 个时以该值填充,
    /// 调用方必须显式过滤.
    #[inline]
    pub fn sentinel(&self) -> usize {
        self.points.len()
    }

    /// `query` 的 k 近邻, 按距离升序返回恰好 `k` 个 `(索引, 欧氏距离)`.
    ///
    /// 树中实际点数不足 `k` 时, 末尾以 `(self.sentinel(), +inf)` 填充.
    /// 若 `query` 本身在点集中, 它会以距离 0 出现在结果里.
    pub fn knn(&self, query: Pos2d, k: usize) -> Vec<(usize, f64)> {
        let mut heap: DistHeap = BinaryHeap::with_capacity_by(k + 1, by_dist2 as DistCmp);
        if k > 0 && !self.is_empty() {
            self.search(0, self.order.len(), 0, query, k, &mut heap);
        }

        let mut ans: Vec<(usize, f64)> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|(i, d2)| (i, d2.sqrt()))
            .collect();
        ans.resize(k, (self.sentinel(), f64::INFINITY));
        ans
    }

    /// `query` 的最近点. 空树返回 `None`.
    pub fn nearest(&self, query: Pos2d) -> Option<(usize, f64)> {
        let first = self.knn(query, 1)[0];
        (first.0 != self.sentinel()).then_some(first)
    }

    fn search(&self, lo: usize, hi: usize, depth: usize, q: Pos2d, k: usize, heap: &mut DistHeap) {
        if lo >= hi {
            return;
        }

        let mid = lo + (hi - lo) / 2;
        let idx = self.order[mid];
        let p = self.points[idx];

        let d2 = dist2(q, p);
        if heap.len() < k {
            heap.push((idx, d2));
        } else if d2 < heap.peek().unwrap().1 {
            heap.push((idx, d2));
            heap.pop();
        }

        let delta = if depth % 2 == 0 { q.0 - p.0 } else { q.1 - p.1 };
        let (near, far) = if delta < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.search(near.0, near.1, depth + 1, q, k, heap);

        // 分割面另一侧仅在可能改进结果时访问.
        if heap.len() < k || delta * delta < heap.peek().unwrap().1 {
            self.search(far.0, far.1, depth + 1, q, k, heap);
        }
    }
}

fn build_rec(points: &[Pos2d], order: &mut [usize], depth: usize) {
    if order.len() <= 1 {
        return;
    }

    let mid = order.len() / 2;
    let axis = depth % 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        axis_val(points[a], axis)
            .partial_cmp(&axis_val(points[b], axis))
            .unwrap()
    });

    let (left, rest) = order.split_at_mut(mid);
    build_rec(points, left, depth + 1);
    build_rec(points, &mut rest[1..], depth + 1);
}

#[inline]
fn axis_val(p: Pos2d, axis: usize) -> f64 {
    if axis == 0 {
        p.0
    } else {
        p.1
    }
}

#[inline]
fn dist2(a: Pos2d, b: Pos2d) -> f64 {
    (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::NotNan;

    /// 无外部依赖的确定性伪随机点列.
    fn lcg_points(n: usize, seed: u64) -> Vec<Pos2d> {
        let mut state = seed;
        let mut next = || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as f64 / (1u64 << 31) as f64) * 100.0
        };
        (0..n).map(|_| (next(), next())).collect()
    }

    fn brute_knn(points: &[Pos2d], q: Pos2d, k: usize) -> Vec<(usize, f64)> {
        let mut all: Vec<(usize, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, &p)| (i, dist2(q, p).sqrt()))
            .collect();
        all.sort_by_key(|&(i, d)| (NotNan::new(d).unwrap(), i));
        all.truncate(k);
        all
    }

    #[test]
    fn test_knn_matches_brute_force() {
        let points = lcg_points(200, 7);
        let tree = KdTree2::build(&points);

        for &q in &[(0.0, 0.0), (50.0, 50.0), (99.9, 0.1), points[17]] {
            let got = tree.knn(q, 8);
            let want = brute_knn(&points, q, 8);
            for (g, w) in got.iter().zip(want.iter()) {
                assert!((g.1 - w.1).abs() < 1e-9);
                assert_eq!(g.0, w.0);
            }
        }
    }

    #[test]
    fn test_knn_sentinel_padding() {
        let points = vec![(0.0, 0.0), (1.0, 0.0), (0.0, 2.0)];
        let tree = KdTree2::build(&points);

        let got = tree.knn((0.0, 0.0), 5);
        assert_eq!(got.len(), 5);
        assert_eq!(got[0], (0, 0.0));
        // 不足的槽位以哨兵填充.
        assert_eq!(got[3].0, tree.sentinel());
        assert_eq!(got[4].0, tree.sentinel());
        assert!(got[3].1.is_infinite());
    }

    #[test]
    fn test_nearest_and_empty_tree() {
        let tree = KdTree2::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.nearest((1.0, 2.0)).is_none());
        assert_eq!(tree.knn((1.0, 2.0), 3).len(), 3);

        let tree = KdTree2::build(&[(3.0, 4.0), (10.0, 10.0)]);
        let (idx, d) = tree.nearest((0.0, 0.0)).unwrap();
        assert_eq!(idx, 0);
        assert!((d - 5.0).abs() < 1e-12);
    }
}
