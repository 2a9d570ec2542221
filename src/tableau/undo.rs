//! The undo stack: every mutating primitive pushes a tagged record, a
//! snapshot is a stack-depth token, and rollback pops and reverses records
//! until the token is reached. This is what lets the parametric driver
//! branch on the context tableau without copying it.

use num_traits::Zero;

use super::{TabId, Tableau};
use crate::error::Error;

#[derive(Debug)]
pub(crate) enum UndoOp {
    /// Clear the non-negativity flag of the entity.
    Nonneg(TabId),
    /// Shrink the redundant zone; the row returns to active scanning.
    Redundant(TabId),
    /// Leave the terminal empty state.
    Empty,
    /// Revive a killed column.
    KillCol(TabId),
    /// Drop the youngest variable or constraint.
    Allocate(TabId),
    /// Re-pivot until the recorded column variables are non-basic again.
    SavedBasis(Vec<TabId>),
    /// Un-evict the youngest evicted sample.
    DropSample,
    /// Pop the youngest mirrored equality from the context set.
    BsetEq,
    /// Pop the youngest mirrored inequality from the context set.
    BsetIneq,
    /// Pop the youngest mirrored div from the context set.
    BsetDiv,
}

impl Tableau {
    /// Pop and reverse undo records until the stack depth equals `snap`.
    pub fn rollback(&mut self, snap: usize) -> Result<(), Error> {
        while self.undo.len() > snap {
            let op = self.undo.pop().expect("undo stack underflow");
            self.reverse(op)?;
        }
        Ok(())
    }

    fn reverse(&mut self, op: UndoOp) -> Result<(), Error> {
        match op {
            UndoOp::Nonneg(id) => {
                self.var_mut(id).is_nonneg = false;
            }
            UndoOp::Redundant(id) => {
                self.var_mut(id).is_redundant = false;
                self.n_redundant -= 1;
                debug_assert_eq!(self.row_var[self.n_redundant], id);
            }
            UndoOp::Empty => {
                self.empty = false;
            }
            UndoOp::KillCol(id) => {
                self.var_mut(id).is_zero = false;
                self.n_dead -= 1;
                debug_assert_eq!(self.col_var[self.n_dead], id);
            }
            UndoOp::Allocate(id) => {
                self.drop_entity(id)?;
            }
            UndoOp::SavedBasis(saved) => {
                self.restore_basis(&saved)?;
            }
            UndoOp::DropSample => {
                self.n_outside -= 1;
            }
            UndoOp::BsetEq => {
                self.bset
                    .as_mut()
                    .ok_or(Error::Internal("no mirrored set to roll back"))?
                    .drop_last_equality();
            }
            UndoOp::BsetIneq => {
                self.bset
                    .as_mut()
                    .ok_or(Error::Internal("no mirrored set to roll back"))?
                    .drop_last_inequality();
            }
            UndoOp::BsetDiv => {
                self.bset
                    .as_mut()
                    .ok_or(Error::Internal("no mirrored set to roll back"))?
                    .drop_last_div();
            }
        }
        Ok(())
    }

    /// Remove the youngest variable or constraint from the tableau. A
    /// column still referenced by some row is first pivoted into that row,
    /// which preserves the remaining constraint system; dropping the row
    /// of a basic entity is always sound because rows never reference
    /// basic entities.
    fn drop_entity(&mut self, id: TabId) -> Result<(), Error> {
        if !self.var(id).is_row {
            let col = self.var(id).index;
            let referencing =
                (self.n_redundant..self.n_row()).find(|&r| !self.rows[r].cols[col].is_zero());
            if let Some(r) = referencing {
                self.pivot(r, col);
            } else {
                debug_assert!((0..self.n_redundant).all(|r| self.rows[r].cols[col].is_zero()));
            }
        }
        if self.var(id).is_row {
            let row = self.var(id).index;
            debug_assert!(row >= self.n_redundant);
            self.drop_row(row);
        } else {
            let col = self.var(id).index;
            debug_assert!(col >= self.n_dead);
            self.drop_col(col);
        }
        match id {
            TabId::Var(i) => {
                if i + 1 != self.vars.len() {
                    return Err(Error::Internal("variables must be dropped youngest first"));
                }
                self.vars.pop();
                let width = 1 + self.vars.len();
                for s in &mut self.samples {
                    s.truncate(width);
                }
            }
            TabId::Con(i) => {
                if i + 1 != self.cons.len() {
                    return Err(Error::Internal("constraints must be dropped youngest first"));
                }
                self.cons.pop();
            }
        }
        Ok(())
    }

    fn drop_row(&mut self, row: usize) {
        let last = self.n_row() - 1;
        self.swap_rows(row, last);
        self.rows.pop();
        self.row_var.pop();
        if let Some(signs) = &mut self.row_signs {
            signs.pop();
        }
    }

    fn drop_col(&mut self, col: usize) {
        let last = self.n_col() - 1;
        self.swap_cols(col, last);
        for r in &mut self.rows {
            r.cols.pop();
        }
        self.col_var.pop();
    }

    /// Pivot every entity that should be non-basic according to `saved`
    /// back into a column. Entities allocated after the record was pushed
    /// have been dropped by earlier undo records, so `saved` matches the
    /// current entity population.
    fn restore_basis(&mut self, saved: &[TabId]) -> Result<(), Error> {
        for &id in saved {
            if !self.var(id).is_row {
                continue;
            }
            let row = self.var(id).index;
            let col = (self.n_dead..self.n_col()).find(|&j| {
                !saved.contains(&self.col_var[j]) && !self.rows[row].cols[j].is_zero()
            });
            let col = col.ok_or(Error::Internal("cannot restore the saved basis"))?;
            self.pivot(row, col);
        }
        Ok(())
    }
}
