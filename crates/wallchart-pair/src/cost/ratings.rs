// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Score-group rating measures, transpositions, and interchanges.
//!
//! Within a score group the canonical pairing puts the upper half against
//! the lower half by rating. `transpose` measures how far a candidate board
//! deviates from that ideal inside the lower half; `interchange` measures
//! upper-half/lower-half deviations against the score-group median. Both
//! store `N·MAX_RATING + rating_delta` per violation, so the number of
//! violations dominates their magnitude, bucketed by the 200/80/0 rating
//! thresholds of rule 29E5.
//!
//! Unrated players in rated sections are measured with the lowest rated
//! player of their score group (rule 29E5g).

use smallvec::SmallVec;
use wallchart_model::{
    cost::{CostValue, MAX_RATING},
    player::Player,
    roster::Roster,
};

use crate::board::PairVec;

type RatingBuf = SmallVec<[i16; 16]>;

/// The median rating of the score group containing `score` (rule 29D):
/// boards fully inside the group when any exist, otherwise every active
/// non-bye-request player; even-sized groups take the lower middle value.
pub fn median_rating(
    roster: &Roster,
    pair: &PairVec,
    score: f32,
    p_begin: usize,
    p_end: usize,
) -> i16 {
    debug_assert!(p_begin % 2 == 0 && p_end % 2 == 0 && p_begin < p_end && p_end <= pair.len());

    let mut in_group: RatingBuf = SmallVec::new();
    let mut fallback: RatingBuf = SmallVec::new();
    for x in (p_begin..p_end).step_by(2) {
        let px = &roster[pair[x]];
        let py = &roster[pair[x + 1]];
        if px.score == score && py.score == score && !px.is_bye() && !py.is_bye() {
            in_group.push(px.rating);
            in_group.push(py.rating);
        }
        if !px.is_bye() && !px.bye_request {
            fallback.push(px.rating);
        }
        if !py.is_bye() && !py.bye_request {
            fallback.push(py.rating);
        }
    }

    for buf in [&mut in_group, &mut fallback] {
        if !buf.is_empty() {
            buf.sort_unstable();
            let mid = buf.len() / 2;
            return if buf.len() % 2 == 1 {
                buf[mid]
            } else {
                buf[mid].min(buf[mid - 1])
            };
        }
    }
    0
}

/// The substitute rating for unrated players: the lowest rated player of the
/// score group, 0 when the group has none (rule 29E5g).
pub fn unrated_rating(
    roster: &Roster,
    pair: &PairVec,
    score: f32,
    p_begin: usize,
    p_end: usize,
) -> i16 {
    debug_assert!(p_begin % 2 == 0 && p_end % 2 == 0 && p_begin < p_end && p_end <= pair.len());

    let mut rating = i16::MAX;
    for x in p_begin..p_end {
        let px = &roster[pair[x]];
        if !px.is_bye()
            && !px.bye_request
            && px.score == score
            && px.rating < rating
            && !px.unrated_in_rated_section()
        {
            rating = px.rating;
        }
    }
    if rating == i16::MAX {
        0
    } else {
        rating
    }
}

#[inline]
fn effective_rating(p: &Player, unrated_rating: i16) -> i32 {
    if p.unrated_in_rated_section() {
        unrated_rating as i32
    } else {
        p.rating as i32
    }
}

#[inline]
fn scaled(players: usize, delta: i32) -> CostValue {
    (players as CostValue).saturating_mul(MAX_RATING) + delta as CostValue
}

/// Rules 27A3, 29C, 29D, 29E5: upper-half/lower-half deviation of one board
/// side against its score-group median, bucketed by `threshold`.
pub fn interchange(
    x: &Player,
    y: &Player,
    players: usize,
    median_rating: i16,
    unrated_rating: i16,
    threshold: i32,
) -> CostValue {
    let dl = threshold;
    let r0 = x.rating as i32;
    let r1 = effective_rating(x, unrated_rating);
    let r2 = y.rating as i32;
    let rm = median_rating as i32;

    if x.is_bye() {
        0
    } else if y.is_bye() {
        // The bye receiver should not sit above the median (rule 28L2).
        if rm + dl < r1 {
            scaled(players, r1 - rm)
        } else {
            0
        }
    } else if x.score == y.score && x.rank > y.rank && rm + dl < r0.min(r2) {
        // Both players of the board above the median.
        scaled(players, r0.min(r2) - rm)
    } else if x.score < y.score && r0 + dl < rm {
        // Pulled-up player below the median.
        scaled(players, rm - r0)
    } else if x.score > y.score && rm + dl < r0 {
        // Dropped-down player above the median.
        scaled(players, r0 - rm)
    } else {
        0
    }
}

/// Rules 29C1, 29E5: the smallest rating transposition inside the score
/// group that would canonicalise the board, scanning boards below in the
/// same group. `a` and `b` are the two slots of one board; only the
/// lower-half side (`a` odd) contributes.
#[allow(clippy::too_many_arguments)]
pub fn transpose(
    roster: &Roster,
    pair: &PairVec,
    a: usize,
    b: usize,
    unrated: i16,
    threshold: i32,
    p_begin: usize,
    p_end: usize,
) -> CostValue {
    debug_assert!(p_begin % 2 == 0 && p_end % 2 == 0 && p_begin < p_end && p_end <= pair.len());
    debug_assert!(p_begin <= a && a < p_end && p_begin <= b && b < p_end);
    debug_assert!(if a % 2 == 0 { b == a + 1 } else { b == a - 1 });

    let players = roster.len();
    let px = &roster[pair[a]];
    let py = &roster[pair[b]];
    if px.is_bye() || py.is_bye() {
        return 0;
    }
    if px.rank < py.rank {
        // Upper half is measured from the boards above; nothing to do here.
        return 0;
    }
    debug_assert!(a % 2 == 1);

    let sx = px.score;
    let sy = py.score;
    let rx = effective_rating(px, unrated);
    let ry = effective_rating(py, unrated);
    let kx = px.rank;
    let dl = threshold;

    let mut cv: CostValue = 0;
    let mut z = a + 1;
    while z < p_end {
        debug_assert!(z % 2 == 0);
        let p1 = &roster[pair[z]];
        let p2 = &roster[pair[z + 1]];
        debug_assert!(p1.rank < p2.rank);
        let s1 = p1.score;
        let s2 = p2.score;
        let r1 = effective_rating(p1, unrated);
        let r2 = effective_rating(p2, unrated);
        // Rule 29E5c: when both boards sit in one score group, the cheaper
        // of the two coupled swaps bounds the transposition.
        let d2 = if sy == sx && s1 == s2 {
            (r2 - rx).min(ry - r1)
        } else {
            r2 - rx
        };
        let k2 = p2.rank;

        // A higher-rated player in the upper half below us: counts for a
        // pull-up, a drop-down, or a bye board.
        if s1 == sx && dl < r1 - rx && (sx < sy || s1 > s2 || p2.is_bye()) {
            cv = cv.saturating_add(scaled(players, r1 - rx));
        }
        // A higher-rated player in the lower half below us.
        if s2 == sx && dl < d2 && !p2.is_bye() && (sx < sy || k2 < kx) {
            cv = cv.saturating_add(scaled(players, d2));
        }
        z += 2;
    }
    cv
}

/// Rules 28A, 28B, 29A: pairing-card order. Rank-tied players (same score
/// and rating, or an unrated upper) must appear in `rand` order down the
/// card; each inversion costs the board-index distance. Returns the raw
/// distance sum plus the ranks involved so the optimiser can target them.
pub fn pairing_card(
    roster: &Roster,
    pair: &PairVec,
) -> (CostValue, Vec<(usize, usize)>) {
    let mut num: CostValue = 0;
    let mut involved: Vec<(usize, usize)> = Vec::new();

    let tied = |a: &Player, b: &Player| -> bool {
        a.paired == b.paired
            && a.score == b.score
            && (a.rating == b.rating || a.rating == 0)
            && !a.is_bye()
            && !b.is_bye()
    };

    for x in (0..pair.len()).step_by(2) {
        for y in ((x + 2)..pair.len()).step_by(2) {
            // Transposed upper half.
            let ux = &roster[pair[x]];
            let uy = &roster[pair[y]];
            if tied(ux, uy) && ux.rand > uy.rand {
                num += pair[x].get().abs_diff(pair[y].get()) as CostValue;
                involved.push((x, y));
            }
            // Transposed lower half.
            let lx = &roster[pair[x + 1]];
            let ly = &roster[pair[y + 1]];
            if tied(lx, ly) && lx.rand > ly.rand {
                num += pair[x + 1].get().abs_diff(pair[y + 1].get()) as CostValue;
                involved.push((x + 1, y + 1));
            }
        }

        let upper = &roster[pair[x]];
        let lower = &roster[pair[x + 1]];
        debug_assert!(upper.score >= lower.score || lower.is_bye() || upper.is_bye());
        let is_drop_down = upper.score != lower.score || lower.is_bye();

        // Interchanged halves of one board.
        if !is_drop_down
            && tied(upper, lower)
            && upper.rating == lower.rating
            && upper.rand > lower.rand
        {
            num += pair[x].get().abs_diff(pair[x + 1].get()) as CostValue;
            involved.push((x, x + 1));
        }
        // Wrong player dropped down.
        if is_drop_down && x > 0 {
            let above = &roster[pair[x - 1]];
            if tied(upper, above) && upper.rating == above.rating && upper.rand < above.rand {
                num += pair[x].get().abs_diff(pair[x - 1].get()) as CostValue;
                involved.push((x, x - 1));
            }
        }
    }
    (num, involved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallchart_model::player::PlayerId;

    fn roster_of(specs: &[(i32, f32, i16)]) -> Roster {
        let players = specs
            .iter()
            .enumerate()
            .map(|(i, (id, score, rating))| {
                let mut p = Player::active(PlayerId::new(*id, 0));
                p.score = *score;
                p.rating = *rating;
                p.rand = 0.01 * (i as f64 + 1.0);
                p
            })
            .collect();
        Roster::canonicalise(players).expect("canonicalise")
    }

    fn identity_pair(roster: &Roster) -> PairVec {
        (0..roster.len())
            .map(wallchart_model::index::RankIndex::new)
            .collect()
    }

    #[test]
    fn test_median_rating_lower_middle_of_even_group() {
        let roster = roster_of(&[(1, 0.0, 2000), (2, 0.0, 1800), (3, 0.0, 1600), (4, 0.0, 1400)]);
        let pair = identity_pair(&roster);
        // Group of four: middle ratings 1800/1600, lower one wins.
        assert_eq!(median_rating(&roster, &pair, 0.0, 0, 4), 1600);
    }

    #[test]
    fn test_unrated_rating_is_group_minimum_rated() {
        let mut roster = roster_of(&[(1, 0.0, 2000), (2, 0.0, 1500), (3, 0.0, 0), (4, 0.0, 1800)]);
        // Mark the zero-rated player as genuinely unrated.
        let n = roster.len();
        for p in roster.players_mut()[..n - 1].iter_mut() {
            if p.rating == 0 {
                p.unrated = true;
            }
        }
        let pair = identity_pair(&roster);
        assert_eq!(unrated_rating(&roster, &pair, 0.0, 0, 4), 1500);
    }

    #[test]
    fn test_interchange_flags_pullup_below_median() {
        let roster = roster_of(&[(1, 1.0, 2000), (2, 0.0, 1200), (3, 0.0, 1900), (4, 0.0, 1850)]);
        let weak = &roster[wallchart_model::index::RankIndex::new(3)];
        let strong = &roster[wallchart_model::index::RankIndex::new(0)];
        // Pulling the 1200 up to play the leader while the group median is
        // far higher is an interchange at every threshold.
        let cv = interchange(weak, strong, 5, 1850, 0, 200);
        assert!(cv > 0);
        assert_eq!(cv % MAX_RATING, (1850 - 1200) as CostValue % MAX_RATING);
    }

    #[test]
    fn test_interchange_clean_board_is_free() {
        let roster = roster_of(&[(1, 0.0, 2000), (2, 0.0, 1800), (3, 0.0, 1600), (4, 0.0, 1400)]);
        let a = &roster[wallchart_model::index::RankIndex::new(0)];
        let b = &roster[wallchart_model::index::RankIndex::new(2)];
        assert_eq!(interchange(a, b, 5, 1600, 0, 0), 0);
        assert_eq!(interchange(b, a, 5, 1600, 0, 0), 0);
    }

    #[test]
    fn test_transpose_detects_lower_half_inversion() {
        // Four players one group; canonical is (0,2),(1,3). The pairing
        // (0,3),(1,2) transposes the lower half: board one's lower (rank 3,
        // 1400) is outranked by board two's lower (rank 2, 1600).
        let roster = roster_of(&[(1, 0.0, 2000), (2, 0.0, 1800), (3, 0.0, 1600), (4, 0.0, 1400)]);
        let r = wallchart_model::index::RankIndex::new;
        let pair: PairVec = vec![r(0), r(3), r(1), r(2)];
        let cv = transpose(&roster, &pair, 1, 0, 0, 0, 0, 4);
        assert!(cv > 0, "inverted lower half must cost");
        let canonical: PairVec = vec![r(0), r(2), r(1), r(3)];
        assert_eq!(transpose(&roster, &canonical, 1, 0, 0, 0, 0, 4), 0);
    }

    #[test]
    fn test_transpose_threshold_screens_small_deltas() {
        // Same inversion but only 40 points apart: below the 80 threshold.
        let roster = roster_of(&[(1, 0.0, 2000), (2, 0.0, 1800), (3, 0.0, 1640), (4, 0.0, 1600)]);
        let r = wallchart_model::index::RankIndex::new;
        let pair: PairVec = vec![r(0), r(3), r(1), r(2)];
        assert!(transpose(&roster, &pair, 1, 0, 0, 0, 0, 4) > 0);
        assert_eq!(transpose(&roster, &pair, 1, 0, 0, 80, 0, 4), 0);
    }

    #[test]
    fn test_pairing_card_flags_rand_inversion() {
        // Two boards of rating-tied players; rand order decides the card.
        let mut roster = roster_of(&[(1, 0.0, 1500), (2, 0.0, 1500), (3, 0.0, 1500), (4, 0.0, 1500)]);
        let n = roster.len();
        let rands = [0.4, 0.1, 0.3, 0.2];
        for (p, r) in roster.players_mut()[..n - 1].iter_mut().zip(rands) {
            p.rand = r;
        }
        roster.set_ranks();
        let r = wallchart_model::index::RankIndex::new;
        // Upper half out of rand order: slot 0 carries a larger rand than
        // slot 2, one board apart.
        let pair: PairVec = vec![r(1), r(2), r(0), r(3)];
        let (num, involved) = pairing_card(&roster, &pair);
        assert_eq!(num, 1);
        assert_eq!(involved, vec![(0, 2)]);
        // The canonical card (ranks in order) is free.
        let clean: PairVec = vec![r(0), r(1), r(2), r(3)];
        let (clean_num, involved) = pairing_card(&roster, &clean);
        assert_eq!(clean_num, 0);
        assert!(involved.is_empty());
    }
}
