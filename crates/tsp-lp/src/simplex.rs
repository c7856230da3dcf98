//! A dense bounded-variable primal simplex over an explicit tableau. Slack/artificial columns
//! are appended one per row; a big-M penalty on artificials drives phase-1 and phase-2 into a
//! single pass, which keeps warm starts simple (one basis, one tableau, no phase switch).

use tsp_core::row::RowSense;

use crate::{Basis, LpError, PivotOutcome, RowSpec, VarStatus};

const BIG_M: f64 = 1.0e7;
const EPS: f64 = 1.0e-9;
const MAX_PIVOTS_PER_OPTIMIZE: usize = 20_000;

#[derive(Debug, Clone, Copy)]
struct Bound {
    lower: f64,
    upper: f64,
}

/// A structural column's identity: its objective coefficient, bounds, and the tableau column
/// index it currently occupies.
#[derive(Debug, Clone)]
struct Column {
    bound: Bound,
    obj: f64,
}

/// Dense bounded-variable primal simplex. Columns `0..num_structural` are the caller's
/// structural variables; one slack/artificial column per row follows.
pub struct DenseBoundedSimplex {
    struct_cols: Vec<Column>,
    row_sense: Vec<RowSense>,
    row_rhs: Vec<f64>,
    /// tableau[row][col], col indexing structural cols then slack cols, row-major.
    tableau: Vec<Vec<f64>>,
    /// Which column is basic in each row.
    basis_header: Vec<usize>,
    /// Per-column status, indexed over structural cols then slack cols.
    status: Vec<VarStatus>,
    /// Current value of every column (structural + slack).
    values: Vec<f64>,
    is_artificial: Vec<bool>,
    objective_row: Vec<f64>,
}

impl DenseBoundedSimplex {
    pub fn new() -> Self {
        DenseBoundedSimplex {
            struct_cols: Vec::new(),
            row_sense: Vec::new(),
            row_rhs: Vec::new(),
            tableau: Vec::new(),
            basis_header: Vec::new(),
            status: Vec::new(),
            values: Vec::new(),
            is_artificial: Vec::new(),
            objective_row: Vec::new(),
        }
    }

    fn num_structural(&self) -> usize {
        self.struct_cols.len()
    }

    fn total_cols(&self) -> usize {
        self.status.len()
    }

    fn bound_of(&self, col: usize) -> Bound {
        if col < self.num_structural() {
            self.struct_cols[col].bound
        } else {
            let row = col - self.num_structural();
            match self.row_sense[row] {
                RowSense::LessEq => Bound { lower: 0.0, upper: f64::INFINITY },
                RowSense::GreaterEq => Bound { lower: -f64::INFINITY, upper: 0.0 },
                RowSense::Equal => Bound { lower: 0.0, upper: 0.0 },
            }
        }
    }

    fn obj_of(&self, col: usize) -> f64 {
        if col < self.num_structural() {
            self.struct_cols[col].obj
        } else {
            let row = col - self.num_structural();
            if self.is_artificial[row] { BIG_M } else { 0.0 }
        }
    }

    fn recompute_objective_row(&mut self) {
        let n = self.total_cols();
        let nrows = self.row_rhs.len();
        let mut z: Vec<f64> = (0..n).map(|c| self.obj_of(c)).collect();
        for row in 0..nrows {
            let basic = self.basis_header[row];
            let cb = self.obj_of(basic);
            if cb == 0.0 {
                continue;
            }
            for c in 0..n {
                z[c] -= cb * self.tableau[row][c];
            }
        }
        self.objective_row = z;
    }

    fn recompute_values(&mut self) {
        let n = self.total_cols();
        let mut vals = vec![0.0_f64; n];
        for col in 0..n {
            if matches!(self.status[col], VarStatus::Basic) {
                continue;
            }
            vals[col] = match self.status[col] {
                VarStatus::AtLower => self.bound_of(col).lower,
                VarStatus::AtUpper => self.bound_of(col).upper,
                VarStatus::Basic => unreachable!(),
            };
        }
        for row in 0..self.row_rhs.len() {
            let basic = self.basis_header[row];
            let mut rhs = self.row_rhs[row];
            for c in 0..n {
                if c == basic || matches!(self.status[c], VarStatus::Basic) {
                    continue;
                }
                rhs -= self.tableau[row][c] * vals[c];
            }
            vals[basic] = rhs;
        }
        self.values = vals;
    }
}

impl Default for DenseBoundedSimplex {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::LpSolver for DenseBoundedSimplex {
    fn num_rows(&self) -> usize {
        self.row_rhs.len()
    }

    fn num_cols(&self) -> usize {
        self.num_structural()
    }

    fn add_columns(&mut self, obj: &[f64], lower: &[f64], upper: &[f64]) -> Vec<usize> {
        let start = self.num_structural();
        let mut new_indices = Vec::with_capacity(obj.len());
        for i in 0..obj.len() {
            self.struct_cols.push(Column {
                bound: Bound { lower: lower[i], upper: upper[i] },
                obj: obj[i],
            });
            new_indices.push(start + i);
        }
        // Slack columns always trail structural ones; rebuild each row by splicing the new
        // structural width in before the existing slack block.
        let nrows = self.row_rhs.len();
        let slack_start_old = start;
        for row in 0..nrows {
            let mut new_row = self.tableau[row][..slack_start_old].to_vec();
            new_row.extend(std::iter::repeat(0.0).take(obj.len()));
            new_row.extend_from_slice(&self.tableau[row][slack_start_old..]);
            self.tableau[row] = new_row;
        }
        for (k, &lo) in lower.iter().enumerate() {
            let initial = if lo.is_finite() { VarStatus::AtLower } else { VarStatus::AtUpper };
            self.status.insert(start + k, initial);
        }
        for basic in self.basis_header.iter_mut() {
            if *basic >= slack_start_old {
                *basic += obj.len();
            }
        }
        self.recompute_objective_row();
        self.recompute_values();
        new_indices
    }

    fn delete_columns(&mut self, indices: &[usize]) {
        let remove: std::collections::HashSet<usize> = indices.iter().copied().collect();
        let keep: Vec<usize> =
            (0..self.num_structural()).filter(|c| !remove.contains(c)).collect();
        let mut remap = vec![usize::MAX; self.num_structural()];
        for (new_idx, &old_idx) in keep.iter().enumerate() {
            remap[old_idx] = new_idx;
        }
        self.struct_cols = keep.iter().map(|&c| self.struct_cols[c].clone()).collect();

        let slack_start_old = remap.len();
        let new_struct_n = keep.len();
        for row in self.tableau.iter_mut() {
            let slacks = row[slack_start_old..].to_vec();
            let mut new_row: Vec<f64> = keep.iter().map(|&c| row[c]).collect();
            new_row.extend(slacks);
            *row = new_row;
        }
        let mut new_status = Vec::with_capacity(new_struct_n + self.row_rhs.len());
        for &c in &keep {
            new_status.push(self.status[c]);
        }
        new_status.extend_from_slice(&self.status[slack_start_old..]);
        self.status = new_status;

        for basic in self.basis_header.iter_mut() {
            if *basic < slack_start_old {
                *basic = remap[*basic];
            } else {
                *basic = new_struct_n + (*basic - slack_start_old);
            }
        }
        self.recompute_objective_row();
        self.recompute_values();
    }

    fn add_rows(&mut self, rows: &[RowSpec]) -> Vec<usize> {
        let struct_n = self.num_structural();
        let old_nrows = self.row_rhs.len();
        let mut new_indices = Vec::with_capacity(rows.len());

        // New slack/artificial columns are appended after every existing column (structural and
        // old slacks alike), so old column indices never move.
        let new_total = struct_n + old_nrows + rows.len();
        for row in self.tableau.iter_mut() {
            row.resize(new_total, 0.0);
        }
        self.status.extend(std::iter::repeat(VarStatus::AtLower).take(rows.len()));

        for (k, spec) in rows.iter().enumerate() {
            let row_idx = old_nrows + k;
            let slack_col = struct_n + row_idx;
            new_indices.push(row_idx);
            self.row_sense.push(spec.sense);
            self.row_rhs.push(spec.rhs);
            self.is_artificial.push(true);

            let mut new_row = vec![0.0_f64; new_total];
            for (&idx, &val) in spec.indices.iter().zip(spec.values.iter()) {
                new_row[idx] = val;
            }
            new_row[slack_col] = 1.0;
            self.tableau.push(new_row);
            self.basis_header.push(slack_col);
        }

        self.recompute_objective_row();
        self.recompute_values();
        new_indices
    }

    fn delete_rows(&mut self, indices: &[usize]) {
        let remove: std::collections::HashSet<usize> = indices.iter().copied().collect();
        let struct_n = self.num_structural();
        let keep_rows: Vec<usize> =
            (0..self.row_rhs.len()).filter(|r| !remove.contains(r)).collect();

        let keep_slack_cols: Vec<usize> = keep_rows.iter().map(|&r| struct_n + r).collect();
        let mut col_remap = vec![usize::MAX; struct_n + self.row_rhs.len()];
        for c in 0..struct_n {
            col_remap[c] = c;
        }
        for (new_idx, &old_col) in keep_slack_cols.iter().enumerate() {
            col_remap[old_col] = struct_n + new_idx;
        }

        self.row_sense = keep_rows.iter().map(|&r| self.row_sense[r]).collect();
        self.row_rhs = keep_rows.iter().map(|&r| self.row_rhs[r]).collect();
        self.is_artificial = keep_rows.iter().map(|&r| self.is_artificial[r]).collect();

        let new_tableau: Vec<Vec<f64>> = keep_rows
            .iter()
            .map(|&r| {
                let old_row = &self.tableau[r];
                let mut new_row = old_row[..struct_n].to_vec();
                new_row.extend(keep_slack_cols.iter().map(|&c| old_row[c]));
                new_row
            })
            .collect();
        self.tableau = new_tableau;

        let mut new_status = self.status[..struct_n].to_vec();
        new_status.extend(keep_slack_cols.iter().map(|&c| self.status[c]));
        self.status = new_status;

        self.basis_header = keep_rows
            .iter()
            .map(|&r| {
                let b = self.basis_header[r];
                col_remap[b]
            })
            .collect();

        self.recompute_objective_row();
        self.recompute_values();
    }

    fn set_bounds(&mut self, col: usize, lower: f64, upper: f64) {
        self.struct_cols[col].bound = Bound { lower, upper };
        self.recompute_values();
    }

    fn get_basis(&self) -> Basis {
        let struct_n = self.num_structural();
        Basis {
            col_status: self.status[..struct_n].to_vec(),
            row_status: self.status[struct_n..].to_vec(),
        }
    }

    fn set_basis(&mut self, basis: &Basis) -> Result<(), LpError> {
        let struct_n = self.num_structural();
        if basis.col_status.len() != struct_n || basis.row_status.len() != self.row_rhs.len() {
            return Err(LpError::Bug("basis shape does not match current LP".into()));
        }
        let mut status = basis.col_status.clone();
        status.extend(basis.row_status.iter().cloned());
        self.status = status;
        self.recompute_values();
        Ok(())
    }

    fn set_col_values(&mut self, x: &[f64]) {
        for (c, &v) in x.iter().enumerate().take(self.num_structural()) {
            if matches!(self.status[c], VarStatus::Basic) {
                self.values[c] = v;
            }
        }
    }

    fn factor_basis(&mut self) -> Result<(), LpError> {
        self.recompute_objective_row();
        self.recompute_values();
        Ok(())
    }

    fn pivot(&mut self) -> Result<PivotOutcome, LpError> {
        self.one_pivot()
    }

    fn optimize(&mut self) -> Result<PivotOutcome, LpError> {
        for _ in 0..MAX_PIVOTS_PER_OPTIMIZE {
            match self.one_pivot()? {
                PivotOutcome::Optimal => {
                    if self.has_positive_artificial() {
                        return Err(LpError::Infeasible);
                    }
                    return Ok(PivotOutcome::Optimal);
                }
                PivotOutcome::Unbounded => return Ok(PivotOutcome::Unbounded),
                PivotOutcome::Infeasible => return Ok(PivotOutcome::Infeasible),
            }
        }
        Err(LpError::NonOptimal("pivot limit exceeded".into()))
    }

    fn objective(&self) -> f64 {
        let struct_n = self.num_structural();
        (0..struct_n).map(|c| self.struct_cols[c].obj * self.values[c]).sum()
    }

    fn get_x(&self) -> Vec<f64> {
        self.values[..self.num_structural()].to_vec()
    }

    fn get_duals(&self) -> Vec<f64> {
        let struct_n = self.num_structural();
        (0..self.row_rhs.len()).map(|r| -self.objective_row[struct_n + r]).collect()
    }

    fn get_slacks(&self) -> Vec<f64> {
        let struct_n = self.num_structural();
        self.values[struct_n..].to_vec()
    }

    fn get_reduced_costs(&self) -> Vec<f64> {
        self.objective_row[..self.num_structural()].to_vec()
    }

    fn get_basis_header(&self) -> Vec<usize> {
        self.basis_header.clone()
    }

    fn tableau_row(&self, basic_row: usize) -> Vec<f64> {
        self.tableau[basic_row].clone()
    }
}

impl DenseBoundedSimplex {
    fn has_positive_artificial(&self) -> bool {
        let struct_n = self.num_structural();
        self.basis_header.iter().any(|&basic| {
            basic >= struct_n
                && self.is_artificial[basic - struct_n]
                && self.values[basic].abs() > 1e-6
        })
    }

    /// One Dantzig-rule bounded-variable simplex iteration: pick the most negative reduced cost
    /// among non-basic columns that can still improve given their status, bounded-ratio-test the
    /// leaving variable, and pivot. Returns `Optimal` when no entering column improves.
    fn one_pivot(&mut self) -> Result<PivotOutcome, LpError> {
        let n = self.total_cols();
        let mut entering: Option<(usize, bool)> = None; // (col, increasing)
        let mut best = -EPS;
        for c in 0..n {
            if matches!(self.status[c], VarStatus::Basic) {
                continue;
            }
            let rc = self.objective_row[c];
            let bound = self.bound_of(c);
            match self.status[c] {
                VarStatus::AtLower if rc < best && bound.upper > bound.lower => {
                    best = rc;
                    entering = Some((c, true));
                }
                VarStatus::AtUpper if -rc < best && bound.upper > bound.lower => {
                    best = -rc;
                    entering = Some((c, false));
                }
                _ => {}
            }
        }
        let (enter_col, increasing) = match entering {
            Some(v) => v,
            None => return Ok(PivotOutcome::Optimal),
        };

        let direction = if increasing { 1.0 } else { -1.0 };
        let enter_bound = self.bound_of(enter_col);
        let mut max_step = enter_bound.upper - enter_bound.lower;

        let mut leave_row: Option<usize> = None;
        for row in 0..self.row_rhs.len() {
            let a = self.tableau[row][enter_col] * direction;
            if a.abs() < EPS {
                continue;
            }
            let basic = self.basis_header[row];
            let bbound = self.bound_of(basic);
            let basic_val = self.values[basic];
            let step = if a > 0.0 {
                (basic_val - bbound.lower) / a
            } else {
                (basic_val - bbound.upper) / a
            };
            if step < max_step - EPS {
                max_step = step;
                leave_row = Some(row);
            } else if step < max_step + EPS && leave_row.is_some() {
                // tie-break on larger pivot magnitude for numerical stability
                if a.abs() > self.tableau[leave_row.unwrap()][enter_col].abs() {
                    leave_row = Some(row);
                }
            }
        }

        if max_step.is_infinite() {
            return Ok(PivotOutcome::Unbounded);
        }

        match leave_row {
            None => {
                // Bound flip: entering variable moves to its opposite bound without a basis change.
                self.status[enter_col] =
                    if increasing { VarStatus::AtUpper } else { VarStatus::AtLower };
                self.recompute_values();
                Ok(PivotOutcome::Optimal)
            }
            Some(row) => {
                let leaving = self.basis_header[row];
                let a = self.tableau[row][enter_col] * direction;
                let went_to_lower = a > 0.0;

                let pivot_val = self.tableau[row][enter_col];
                for c in 0..n {
                    self.tableau[row][c] /= pivot_val;
                }
                for r in 0..self.row_rhs.len() {
                    if r == row {
                        continue;
                    }
                    let factor = self.tableau[r][enter_col];
                    if factor.abs() < EPS {
                        continue;
                    }
                    for c in 0..n {
                        self.tableau[r][c] -= factor * self.tableau[row][c];
                    }
                }
                let factor = self.objective_row[enter_col];
                if factor.abs() > EPS {
                    for c in 0..n {
                        self.objective_row[c] -= factor * self.tableau[row][c];
                    }
                }

                self.status[leaving] =
                    if went_to_lower { VarStatus::AtLower } else { VarStatus::AtUpper };
                self.status[enter_col] = VarStatus::Basic;
                self.basis_header[row] = enter_col;
                self.recompute_values();
                Ok(PivotOutcome::Optimal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LpSolver;

    #[test]
    fn maximize_trivial_lp() {
        // min -x - y  s.t. x + y <= 4, x <= 3, y <= 3, x,y >= 0
        let mut lp = DenseBoundedSimplex::new();
        lp.add_columns(&[-1.0, -1.0], &[0.0, 0.0], &[3.0, 3.0]);
        lp.add_rows(&[RowSpec {
            indices: vec![0, 1],
            values: vec![1.0, 1.0],
            sense: RowSense::LessEq,
            rhs: 4.0,
        }]);
        let outcome = lp.optimize().unwrap();
        assert_eq!(outcome, PivotOutcome::Optimal);
        let x = lp.get_x();
        assert!((x[0] + x[1] - 4.0).abs() < 1e-6, "x={:?}", x);
        assert!((lp.objective() + 4.0).abs() < 1e-6);
    }

    #[test]
    fn equality_row_is_enforced() {
        // min x + y s.t. x + y = 2, 0 <= x,y <= 2
        let mut lp = DenseBoundedSimplex::new();
        lp.add_columns(&[1.0, 1.0], &[0.0, 0.0], &[2.0, 2.0]);
        lp.add_rows(&[RowSpec {
            indices: vec![0, 1],
            values: vec![1.0, 1.0],
            sense: RowSense::Equal,
            rhs: 2.0,
        }]);
        let outcome = lp.optimize().unwrap();
        assert_eq!(outcome, PivotOutcome::Optimal);
        let x = lp.get_x();
        assert!((x[0] + x[1] - 2.0).abs() < 1e-6, "x={:?}", x);
    }
}
