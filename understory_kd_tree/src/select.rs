// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Order-statistic selection (Floyd–Rivest) and median cuts.
//!
//! Selection rearranges a slice in place so that the element at index `k` is the one a full
//! sort would put there, with nothing larger before it and nothing smaller after it. The
//! slice is not otherwise sorted. Expected cost is linear.

use glam::DVec3;
use understory_polytope::Axis;

/// Ranges longer than this are first narrowed by recursing on a sample window around `k`.
const SAMPLE_THRESHOLD: isize = 600;

/// Rearrange `items` so that `items[k]` has rank `k` under `key`.
///
/// Afterwards every element before `k` has a key `<=` the key at `k`, and every element
/// after has a key `>=`. Out-of-range `k` leaves the slice untouched. Keys must not be NaN.
pub fn select_by<T, F>(items: &mut [T], k: usize, key: F)
where
    F: Fn(&T) -> f64,
{
    if k >= items.len() {
        return;
    }
    floyd_rivest(items, 0, items.len() as isize - 1, k as isize, &key);
}

/// Partition points around their median along `axis`.
///
/// Returns the median index `n / 2` and the cut coordinate: the mean of the largest value
/// left of the median and the median value itself. Returns `None` for an empty slice.
pub fn select(points: &mut [DVec3], axis: Axis) -> Option<(usize, f64)> {
    if points.is_empty() {
        return None;
    }
    let a = axis.index();
    let m = points.len() / 2;
    select_by(points, m, |p| p[a]);
    let median = points[m][a];
    let coordinate = if m == 0 {
        median
    } else {
        let left_max = points[..m]
            .iter()
            .map(|p| p[a])
            .fold(f64::NEG_INFINITY, f64::max);
        0.5 * (left_max + median)
    };
    Some((m, coordinate))
}

/// Split `items` near the median into two non-empty parts separated by a cut coordinate.
///
/// On success returns `(cut, coordinate)` with every key in `items[..cut]` strictly below
/// `coordinate` and every key in `items[cut..]` at or above it. The run of keys equal to the
/// median stays on one side, whichever keeps the halves closer to balanced. The coordinate
/// is the midpoint between the largest key left of the cut and the smallest key right of it.
/// Returns `None` if fewer than two distinct keys exist.
pub fn median_cut_by<T, F>(items: &mut [T], key: F) -> Option<(usize, f64)>
where
    F: Fn(&T) -> f64,
{
    let n = items.len();
    if n < 2 {
        return None;
    }
    let m = n / 2;
    select_by(items, m, &key);
    let median = key(&items[m]);

    // Gather the median run into items[below..above].
    let mut below = 0;
    for i in 0..m {
        if key(&items[i]) < median {
            items.swap(below, i);
            below += 1;
        }
    }
    let mut above = m;
    for i in m..n {
        if key(&items[i]) == median {
            items.swap(above, i);
            above += 1;
        }
    }

    let cut_below = (below > 0).then_some(below);
    let cut_above = (above < n).then_some(above);
    let cut = match (cut_below, cut_above) {
        (Some(b), Some(a)) => {
            if m - b <= a - m {
                b
            } else {
                a
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    let left_max = items[..cut]
        .iter()
        .map(&key)
        .fold(f64::NEG_INFINITY, f64::max);
    let right_min = items[cut..]
        .iter()
        .map(&key)
        .fold(f64::INFINITY, f64::min);
    let mut coordinate = 0.5 * left_max + 0.5 * right_min;
    // Adjacent floats can round the midpoint down onto the left value.
    if coordinate <= left_max {
        coordinate = right_min;
    }
    Some((cut, coordinate))
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "The sample window is clamped to the current range."
)]
fn floyd_rivest<T, F>(items: &mut [T], mut left: isize, mut right: isize, k: isize, key: &F)
where
    F: Fn(&T) -> f64,
{
    while right > left {
        if right - left > SAMPLE_THRESHOLD {
            let n = (right - left + 1) as f64;
            let i = (k - left + 1) as f64;
            let z = n.ln();
            let s = 0.5 * (2.0 * z / 3.0).exp();
            let side = i - n / 2.0;
            let sign = if side < 0.0 {
                -1.0
            } else if side > 0.0 {
                1.0
            } else {
                0.0
            };
            let sd = 0.5 * (z * s * (n - s) / n).sqrt() * sign;
            let new_left = left.max((k as f64 - i * s / n + sd).floor() as isize);
            let new_right = right.min((k as f64 + (n - i) * s / n + sd).floor() as isize);
            floyd_rivest(items, new_left, new_right, k, key);
        }

        let t = key(&items[k as usize]);
        let mut i = left;
        let mut j = right;
        items.swap(left as usize, k as usize);
        if key(&items[right as usize]) > t {
            items.swap(right as usize, left as usize);
        }
        while i < j {
            items.swap(i as usize, j as usize);
            i += 1;
            j -= 1;
            while key(&items[i as usize]) < t {
                i += 1;
            }
            while key(&items[j as usize]) > t {
                j -= 1;
            }
        }
        if key(&items[left as usize]) == t {
            items.swap(left as usize, j as usize);
        } else {
            j += 1;
            items.swap(j as usize, right as usize);
        }
        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}
