use super::board::{Score, Tile, BOARD_SIZE};

/// One element's journey within a collapsed line. Indices are positions in
/// the oriented line, with 0 at the direction-of-travel end. `value` is the
/// value sitting at `dest` after the pass, so a merged record carries the
/// doubled value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LineMove {
    pub(crate) origin: usize,
    pub(crate) dest: usize,
    pub(crate) value: Tile,
    pub(crate) merged: bool,
}

#[derive(Debug, PartialEq)]
pub(crate) struct CollapsedLine {
    pub(crate) cells: [Tile; BOARD_SIZE],
    pub(crate) moves: Vec<LineMove>,
    pub(crate) score_gain: Score,
    pub(crate) max_value: Tile,
}

/// Slide a single oriented line toward index 0, merging equal neighbors.
///
/// Single left-to-right pass over the non-zero elements in original order.
/// A slot that was produced by a merge earlier in the same pass never absorbs
/// a third tile; `last_merge` marks that slot. Merges compare against the
/// previous slot of the output line, so gaps in the input are irrelevant.
pub(crate) fn collapse(line: [Tile; BOARD_SIZE]) -> CollapsedLine {
    let mut cells = [0; BOARD_SIZE];
    let mut moves = Vec::with_capacity(BOARD_SIZE);
    let mut score_gain: Score = 0;
    let mut max_value: Tile = 0;
    let mut dest = 0usize;
    let mut last_merge: Option<usize> = None;

    for (origin, &value) in line.iter().enumerate() {
        if value == 0 {
            continue;
        }
        if dest > 0 && cells[dest - 1] == value && last_merge != Some(dest - 1) {
            dest -= 1;
            cells[dest] *= 2;
            score_gain += cells[dest];
            max_value = max_value.max(cells[dest]);
            moves.push(LineMove {
                origin,
                dest,
                value: cells[dest],
                merged: true,
            });
            last_merge = Some(dest);
        } else {
            cells[dest] = value;
            max_value = max_value.max(value);
            moves.push(LineMove {
                origin,
                dest,
                value,
                merged: false,
            });
        }
        dest += 1;
    }

    CollapsedLine {
        cells,
        moves,
        score_gain,
        max_value,
    }
}
