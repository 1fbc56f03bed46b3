//! Poseidon hash over any prime field.
//!
//! Width t=3, R_F=8 full rounds, R_P=57 partial rounds, S-box x^5. Round
//! constants come from the Grain LFSR of the Poseidon paper (ePrint
//! 2019/458, Appendix E) seeded with the field's bit size; the MDS matrix is
//! the Cauchy matrix `M[i][j] = 1/(i + j + t)`.
//!
//! Inputs are absorbed two at a time into the rate lanes `state[1..3]`; the
//! capacity lane `state[0]` starts at the input length and is the output.
//!
//! Two implementations live here:
//! 1. native computation ([`hash`]), used when preparing assignments
//! 2. a gadget ([`hash_gadget`]) built from [`CircuitApi`] operations
//!
//! Both must agree on every input.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use ark_ff::{BigInteger, PrimeField};

use crate::builder::CircuitApi;
use crate::r1cs::LinearCombination;

/// Inputs absorbed per permutation.
pub const RATE: usize = 2;

// ============================================================================
// Parameters
// ============================================================================

/// Poseidon permutation parameters.
#[derive(Clone, Debug)]
pub struct PoseidonParams<F: PrimeField> {
    /// State width.
    pub t: usize,
    /// Full rounds, split evenly around the partial rounds.
    pub r_f: usize,
    /// Partial rounds.
    pub r_p: usize,
    /// `(r_f + r_p) * t` round constants.
    pub round_constants: Vec<F>,
    /// `t x t` MDS matrix, row-major.
    pub mds: Vec<Vec<F>>,
}

impl<F: PrimeField> PoseidonParams<F> {
    /// Construct from explicit components.
    ///
    /// Panics when the component sizes do not match `t`, `r_f` and `r_p`.
    pub fn new(t: usize, r_f: usize, r_p: usize, round_constants: Vec<F>, mds: Vec<Vec<F>>) -> Self {
        assert_eq!(
            round_constants.len(),
            (r_f + r_p) * t,
            "expected {} round constants, got {}",
            (r_f + r_p) * t,
            round_constants.len()
        );
        assert_eq!(mds.len(), t, "MDS must be {t}x{t}");
        for row in &mds {
            assert_eq!(row.len(), t, "MDS row must have {t} elements");
        }
        Self {
            t,
            r_f,
            r_p,
            round_constants,
            mds,
        }
    }

    /// t=3, R_F=8, R_P=57 with Grain LFSR constants and a Cauchy MDS.
    #[allow(clippy::needless_range_loop)]
    pub fn width3() -> Self {
        let (t, r_f, r_p) = (3usize, 8usize, 57usize);

        let mut mds = vec![vec![F::zero(); t]; t];
        for i in 0..t {
            for j in 0..t {
                // i + j + t is never 0 mod p for these tiny values
                mds[i][j] = F::from((i + j + t) as u64)
                    .inverse()
                    .unwrap_or_else(F::zero);
            }
        }

        let mut grain = GrainLfsr::new(F::MODULUS_BIT_SIZE as u16, t as u16, r_f as u16, r_p as u16);
        let round_constants = (0..(r_f + r_p) * t)
            .map(|_| grain.next_field_element::<F>())
            .collect();

        Self::new(t, r_f, r_p, round_constants, mds)
    }
}

/// Shared [`PoseidonParams::width3`] instance for `F`, generated once.
pub fn params<F: PrimeField>() -> Arc<PoseidonParams<F>> {
    static CACHE: OnceLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> = OnceLock::new();

    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let entry = cache
        .entry(TypeId::of::<F>())
        .or_insert_with(|| Arc::new(PoseidonParams::<F>::width3()) as Arc<dyn Any + Send + Sync>);
    match Arc::clone(entry).downcast::<PoseidonParams<F>>() {
        Ok(params) => params,
        // unreachable: entries are keyed by their own TypeId
        Err(_) => Arc::new(PoseidonParams::width3()),
    }
}

// ============================================================================
// Grain LFSR
// ============================================================================

/// 80-bit LFSR that generates round constants.
struct GrainLfsr {
    state: [bool; 80],
}

impl GrainLfsr {
    /// Encoding: [field:2][sbox:4][field_size:12][t:12][R_F:10][R_P:10][ones:30]
    fn new(field_size: u16, t: u16, r_f: u16, r_p: u16) -> Self {
        let mut bits = [false; 80];
        let mut pos = 0;
        let mut push = |value: u16, width: usize| {
            for i in 0..width {
                bits[pos + i] = (value >> (width - 1 - i)) & 1 == 1;
            }
            pos += width;
        };

        push(1, 2); // prime field
        push(0, 4); // x^alpha
        push(field_size, 12);
        push(t, 12);
        push(r_f, 10);
        push(r_p, 10);
        for bit in bits.iter_mut().skip(50) {
            *bit = true;
        }

        let mut lfsr = Self { state: bits };
        for _ in 0..160 {
            lfsr.clock();
        }
        lfsr
    }

    fn clock(&mut self) -> bool {
        let s = &self.state;
        let new_bit = s[0] ^ s[13] ^ s[23] ^ s[38] ^ s[51] ^ s[62];
        self.state.copy_within(1.., 0);
        self.state[79] = new_bit;
        new_bit
    }

    /// Self-shrinking output: keep the second bit of each pair whose first is set.
    fn next_bit(&mut self) -> bool {
        loop {
            let control = self.clock();
            let candidate = self.clock();
            if control {
                return candidate;
            }
        }
    }

    /// Sample `MODULUS_BIT_SIZE` bits (big-endian) until the value is below p.
    fn next_field_element<F: PrimeField>(&mut self) -> F {
        let n = F::MODULUS_BIT_SIZE as usize;
        loop {
            let mut bits = Vec::with_capacity(n);
            for _ in 0..n {
                bits.push(self.next_bit());
            }
            if let Some(value) = F::from_bigint(F::BigInt::from_bits_be(&bits)) {
                return value;
            }
        }
    }
}

// ============================================================================
// Native
// ============================================================================

fn sbox<F: PrimeField>(x: F) -> F {
    let x2 = x.square();
    let x4 = x2.square();
    x4 * x
}

fn is_full_round<F: PrimeField>(params: &PoseidonParams<F>, r: usize) -> bool {
    let half_f = params.r_f / 2;
    r < half_f || r >= half_f + params.r_p
}

/// Apply the permutation to `state` in place.
#[allow(clippy::needless_range_loop)]
pub fn permute<F: PrimeField>(params: &PoseidonParams<F>, state: &mut [F]) {
    debug_assert_eq!(state.len(), params.t);
    for r in 0..params.r_f + params.r_p {
        for i in 0..params.t {
            state[i] += params.round_constants[r * params.t + i];
        }

        if is_full_round(params, r) {
            for x in state.iter_mut() {
                *x = sbox(*x);
            }
        } else {
            state[0] = sbox(state[0]);
        }

        let old = state.to_vec();
        for i in 0..params.t {
            state[i] = params.mds[i]
                .iter()
                .zip(&old)
                .fold(F::zero(), |acc, (m, x)| acc + *m * x);
        }
    }
}

/// Hash a sequence of field elements.
///
/// The empty input still runs one permutation of the zero state.
pub fn hash<F: PrimeField>(params: &PoseidonParams<F>, inputs: &[F]) -> F {
    let mut state = vec![F::zero(); params.t];
    state[0] = F::from(inputs.len() as u64);
    if inputs.is_empty() {
        permute(params, &mut state);
    }
    for chunk in inputs.chunks(RATE) {
        for (lane, value) in state[1..].iter_mut().zip(chunk) {
            *lane += value;
        }
        permute(params, &mut state);
    }
    state[0]
}

// ============================================================================
// Gadget
// ============================================================================

/// x^5 as three multiplications.
fn sbox_gadget<F: PrimeField>(api: &mut CircuitApi<'_, F>, x: LinearCombination<F>) -> LinearCombination<F> {
    let x2 = api.square(x.clone());
    let x4 = api.square(x2);
    api.mul(x4, x)
}

/// In-circuit permutation.
///
/// Round constants and the MDS layer fold into linear combinations; only
/// S-boxes cost constraints. In partial rounds the untouched lanes are
/// materialized so their linear combinations stay a few terms long.
pub fn permute_gadget<F: PrimeField>(
    api: &mut CircuitApi<'_, F>,
    params: &PoseidonParams<F>,
    mut state: Vec<LinearCombination<F>>,
) -> Vec<LinearCombination<F>> {
    debug_assert_eq!(state.len(), params.t);
    for r in 0..params.r_f + params.r_p {
        for (i, lane) in state.iter_mut().enumerate() {
            let rc = params.round_constants[r * params.t + i];
            *lane = api.add_constant(lane.clone(), rc);
        }

        let full = is_full_round(params, r);
        if full {
            for lane in state.iter_mut() {
                *lane = sbox_gadget(api, lane.clone());
            }
        } else {
            state[0] = sbox_gadget(api, state[0].clone());
        }

        let mixed: Vec<_> = params
            .mds
            .iter()
            .map(|row| api.sum(row.iter().zip(&state).map(|(m, x)| api.scale(x.clone(), *m))))
            .collect();
        state = mixed;

        if !full {
            for lane in state.iter_mut().skip(1) {
                *lane = api.materialize(lane.clone()).into();
            }
        }
    }
    state
}

/// In-circuit [`hash`].
pub fn hash_gadget<F: PrimeField>(
    api: &mut CircuitApi<'_, F>,
    params: &PoseidonParams<F>,
    inputs: &[LinearCombination<F>],
) -> LinearCombination<F> {
    let mut state = vec![LinearCombination::zero(); params.t];
    state[0] = api.constant(inputs.len() as u64);
    if inputs.is_empty() {
        state = permute_gadget(api, params, state);
    }
    for chunk in inputs.chunks(RATE) {
        for (lane, value) in state[1..].iter_mut().zip(chunk) {
            *lane = api.add(lane.clone(), value.clone());
        }
        state = permute_gadget(api, params, state);
    }
    state.swap_remove(0)
}
