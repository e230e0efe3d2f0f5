//! Helpers for the position permutations stored by reordering stages.
//!
//! A permutation `perm` of length `n` says that the i-th stored entry came from
//! original position `perm[i]`. It must be a bijection on `0..n`; anything else
//! read from a record is rejected before it is used to index.

use crate::error::SjzipError;

/// Checks that `perm` is a bijection on `0..perm.len()`.
pub fn validate(perm: &[u16]) -> Result<(), SjzipError> {
    let mut seen = vec![false; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        let slot = seen.get_mut(p as usize).ok_or_else(|| SjzipError::CorruptPacket {
            position: i,
            reason: format!("permutation entry {} is out of range for length {}", p, perm.len()),
        })?;
        if *slot {
            return Err(SjzipError::CorruptPacket {
                position: i,
                reason: format!("permutation entry {} appears twice", p),
            });
        }
        *slot = true;
    }
    Ok(())
}

/// Restores original order: `out[perm[i]] = stored[i]`.
pub fn restore<T: Copy>(stored: &[T], perm: &[u16]) -> Result<Vec<T>, SjzipError> {
    if stored.len() != perm.len() {
        return Err(SjzipError::CorruptPacket {
            position: stored.len().min(perm.len()),
            reason: format!(
                "{} entries but a permutation of length {}",
                stored.len(),
                perm.len()
            ),
        });
    }
    validate(perm)?;

    let mut out: Vec<Option<T>> = vec![None; stored.len()];
    for (&value, &p) in stored.iter().zip(perm) {
        out[p as usize] = Some(value);
    }
    // `validate` guarantees every slot was written exactly once.
    out.into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| SjzipError::InternalError(format!("position {} left unfilled", i)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_inverts_gather() {
        let original = ['a', 'b', 'c', 'd'];
        let perm = [2u16, 0, 3, 1];
        let stored: Vec<char> = perm.iter().map(|&p| original[p as usize]).collect();
        assert_eq!(restore(&stored, &perm).unwrap(), original.to_vec());
    }

    #[test]
    fn test_rejects_duplicates_and_out_of_range() {
        assert!(matches!(
            validate(&[0, 1, 1]),
            Err(SjzipError::CorruptPacket { position: 2, .. })
        ));
        assert!(matches!(
            validate(&[0, 3, 1]),
            Err(SjzipError::CorruptPacket { position: 1, .. })
        ));
        assert!(validate(&[]).is_ok());
    }

    #[test]
    fn test_restore_rejects_length_mismatch() {
        assert!(restore(&[1, 2, 3], &[0, 1]).is_err());
    }
}
