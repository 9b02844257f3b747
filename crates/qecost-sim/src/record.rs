//! Resolution of `rec[-k]` lookbacks to absolute measurement indices.

use qecost_ir::{Circuit, Gate, Target};

use crate::error::{SimError, SimResult};

/// Which measurements feed each detector and observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    num_measurements: usize,
    detectors: Vec<Vec<usize>>,
    observables: Vec<Vec<usize>>,
}

impl RecordLayout {
    /// Walk the unrolled circuit once and resolve every lookback.
    pub fn from_circuit(circuit: &Circuit) -> SimResult<Self> {
        let num_observables = circuit.num_observables();
        if num_observables > 64 {
            return Err(SimError::TooManyObservables(num_observables));
        }

        let mut measured: usize = 0;
        let mut detectors = Vec::new();
        let mut observables = vec![Vec::new(); num_observables as usize];

        for inst in circuit.iter_flat() {
            match inst.gate() {
                Gate::Detector => detectors.push(resolve(inst.targets(), measured)?),
                Gate::ObservableInclude => {
                    if let Some(index) = inst.observable_index() {
                        observables[index as usize].extend(resolve(inst.targets(), measured)?);
                    }
                }
                _ => measured += inst.num_measurements() as usize,
            }
        }

        Ok(Self {
            num_measurements: measured,
            detectors,
            observables,
        })
    }

    pub fn num_measurements(&self) -> usize {
        self.num_measurements
    }

    pub fn num_detectors(&self) -> usize {
        self.detectors.len()
    }

    pub fn num_observables(&self) -> usize {
        self.observables.len()
    }

    /// Measurement indices XORed into each detector.
    pub fn detectors(&self) -> &[Vec<usize>] {
        &self.detectors
    }

    /// Measurement indices XORed into each observable.
    pub fn observables(&self) -> &[Vec<usize>] {
        &self.observables
    }

    /// For each measurement, the symptom columns it flips when its result flips.
    ///
    /// Detector `d` is column `d`; observable `o` is column `num_detectors + o`.
    /// A measurement listed twice by the same detector cancels out.
    pub fn fanout(&self) -> Vec<Vec<usize>> {
        let mut fanout = vec![Vec::new(); self.num_measurements];
        let offset = self.detectors.len();
        let columns = self
            .detectors
            .iter()
            .enumerate()
            .chain(self.observables.iter().enumerate().map(|(o, m)| (offset + o, m)));
        for (column, measurements) in columns {
            for &m in measurements {
                let entry: &mut Vec<usize> = &mut fanout[m];
                if let Some(pos) = entry.iter().position(|&c| c == column) {
                    entry.swap_remove(pos);
                } else {
                    entry.push(column);
                }
            }
        }
        fanout
    }
}

fn resolve(targets: &[Target], measured: usize) -> SimResult<Vec<usize>> {
    targets
        .iter()
        .filter_map(|t| t.lookback())
        .map(|k| {
            measured
                .checked_sub(k as usize)
                .ok_or(SimError::RecordOutOfRange {
                    lookback: k,
                    available: measured as u64,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_lookbacks_through_repeat() {
        let circuit: Circuit = "\
MR 1
REPEAT 3 {
    MR 1
    DETECTOR rec[-1] rec[-2]
}
M 0
OBSERVABLE_INCLUDE(0) rec[-1]
"
        .parse()
        .unwrap();
        let layout = RecordLayout::from_circuit(&circuit).unwrap();

        assert_eq!(layout.num_measurements(), 5);
        let detectors: Vec<Vec<usize>> = vec![vec![1, 0], vec![2, 1], vec![3, 2]];
        assert_eq!(layout.detectors(), detectors.as_slice());
        assert_eq!(layout.observables()[0], vec![4]);
    }

    #[test]
    fn test_fanout_columns() {
        let circuit: Circuit = "M 0 1\nDETECTOR rec[-1] rec[-2]\nDETECTOR rec[-1]\nOBSERVABLE_INCLUDE(0) rec[-2]\n"
            .parse()
            .unwrap();
        let fanout = RecordLayout::from_circuit(&circuit).unwrap().fanout();

        assert_eq!(fanout[0], vec![0, 2]);
        assert_eq!(fanout[1], vec![0, 1]);
    }

    #[test]
    fn test_duplicate_measurement_cancels() {
        let circuit: Circuit = "M 0\nDETECTOR rec[-1] rec[-1]\n".parse().unwrap();
        let fanout = RecordLayout::from_circuit(&circuit).unwrap().fanout();
        assert!(fanout[0].is_empty());
    }

    #[test]
    fn test_lookback_out_of_range() {
        let circuit: Circuit = "M 0\nDETECTOR rec[-2]\n".parse().unwrap();
        assert!(matches!(
            RecordLayout::from_circuit(&circuit),
            Err(SimError::RecordOutOfRange {
                lookback: 2,
                available: 1
            })
        ));
    }
}
