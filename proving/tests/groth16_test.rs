//! End-to-end Groth16 tests.
//!
//! These exercise the full pipeline: circuit → compile → setup → witness →
//! prove → encode/decode → verify, over BN254 and BLS12-381.

#![cfg(all(feature = "bn254", feature = "bls12-381"))]

use std::sync::Arc;

use ark_bn254::{Bn254, Fr};
use ark_ec::AffineRepr;
use ark_ff::PrimeField;
use constraints::circuits::{ClaimCircuit, CubicCircuit};
use constraints::{
    build_witness, compile, Circuit, CircuitApi, CircuitDefinitionError, ConstraintSystem, Declarations,
    LinearCombination, PublicWitness, Variable, Witness,
};
use proving::artifacts;
use proving::{
    prove, setup, setup_with_options, verify, Artifact, DeserializationError, PointEncoding, PreparedVerifier,
    Proof, ProvingError, ProvingKey, SetupError, SetupOptions, SetupRandomness, Stage, VerificationError,
    VerifyingKey,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seed(n: u8) -> SetupRandomness {
    SetupRandomness::from_seed([n; 32])
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn cubic<F: PrimeField>() -> Arc<ConstraintSystem<F>> {
    compile(&CubicCircuit).unwrap()
}

fn cubic_witness<F: PrimeField>(cs: &ConstraintSystem<F>, x: u64, y: u64) -> Witness<F> {
    build_witness(cs, &CubicCircuit::assignment(x, y)).unwrap()
}

/// `y == x³ + x + 6`: same wire count as the cubic, different system.
struct Shifted;

impl Circuit<Fr> for Shifted {
    type Wires = (Variable, Variable);

    fn declare(&self, vars: &mut Declarations<'_, Fr>) -> Result<Self::Wires, CircuitDefinitionError> {
        Ok((vars.private("x")?, vars.public("y")?))
    }

    fn define(&self, api: &mut CircuitApi<'_, Fr>, &(x, y): &Self::Wires) -> Result<(), CircuitDefinitionError> {
        let x3 = api.product([x, x, x]);
        let lhs = api.add(x3, x);
        let lhs = api.add_constant(lhs, 6u64);
        api.assert_equal(y, lhs)
    }
}

struct Fixture {
    cs: Arc<ConstraintSystem<Fr>>,
    pk: ProvingKey<Bn254>,
    vk: VerifyingKey<Bn254>,
    proof: Proof<Bn254>,
    public: PublicWitness<Fr>,
}

fn fixture() -> Fixture {
    let cs = cubic::<Fr>();
    let (pk, vk) = setup::<Bn254>(&cs, seed(1)).unwrap();
    let witness = cubic_witness(&cs, 3, 35);
    let proof = prove(&cs, &pk, &witness, &mut rng()).unwrap();
    Fixture {
        cs,
        pk,
        vk,
        proof,
        public: witness.public(),
    }
}

// ============================================================================
// Completeness and soundness
// ============================================================================

#[test]
fn test_cubic_proof_verifies_bn254() {
    let f = fixture();
    assert_eq!(f.public.values(), &[Fr::from(35u64)]);
    assert!(verify(&f.proof, &f.vk, &f.public).unwrap());
}

#[test]
fn test_cubic_proof_verifies_bls12_381() {
    use ark_bls12_381::{Bls12_381, Fr as BlsFr};
    let cs = cubic::<BlsFr>();
    let (pk, vk) = setup::<Bls12_381>(&cs, seed(2)).unwrap();
    let witness = cubic_witness(&cs, 3, 35);
    let proof = prove(&cs, &pk, &witness, &mut rng()).unwrap();
    assert!(verify(&proof, &vk, &witness.public()).unwrap());
}

#[test]
fn test_wrong_public_input_rejected() {
    let f = fixture();
    let forged = PublicWitness::new(f.public.circuit_digest(), vec![Fr::from(36u64)]);
    assert!(!verify(&f.proof, &f.vk, &forged).unwrap());
}

#[test]
fn test_claim_circuit_proof_verifies() {
    let circuit = ClaimCircuit::new(["iss", "sub", "email"], ["iss", "email"]).unwrap();
    let cs = compile::<Fr, _>(&circuit).unwrap();
    let (pk, vk) = setup::<Bn254>(&cs, seed(3)).unwrap();
    let claims = [Fr::from(100u64), Fr::from(200u64), Fr::from(300u64)];
    let assignment = circuit.assignment(Fr::from(9u64), &claims, Fr::from(77u64)).unwrap();
    let witness = build_witness(&cs, &assignment).unwrap();
    let proof = prove(&cs, &pk, &witness, &mut rng()).unwrap();
    let public = witness.public();
    assert_eq!(public.values()[..3], [Fr::from(9u64), Fr::from(100u64), Fr::from(300u64)]);
    assert!(verify(&proof, &vk, &public).unwrap());
}

#[test]
fn test_proofs_are_unlinkable() {
    let f = fixture();
    let witness = cubic_witness(&f.cs, 3, 35);
    let again = proving::prove_with_os_rng(&f.cs, &f.pk, &witness).unwrap();
    assert_ne!(f.proof, again);
    assert_ne!(f.proof.to_bytes().unwrap(), again.to_bytes().unwrap());
    assert!(verify(&again, &f.vk, &f.public).unwrap());
}

#[test]
fn test_prepared_verifier_reuse() {
    let f = fixture();
    let verifier = PreparedVerifier::new(&f.vk);
    let forged = PublicWitness::new(f.public.circuit_digest(), vec![Fr::from(1u64)]);
    assert!(verifier.verify(&f.proof, &f.public).unwrap());
    assert!(!verifier.verify(&f.proof, &forged).unwrap());
    assert!(verifier.verify(&f.proof, &f.public).unwrap());
}

// ============================================================================
// Setup
// ============================================================================

#[test]
fn test_same_seed_same_keys() {
    let cs = cubic::<Fr>();
    let (pk1, vk1) = setup::<Bn254>(&cs, seed(5)).unwrap();
    let (pk2, vk2) = setup::<Bn254>(&cs, seed(5)).unwrap();
    assert_eq!(pk1.to_bytes().unwrap(), pk2.to_bytes().unwrap());
    assert_eq!(vk1.to_bytes().unwrap(), vk2.to_bytes().unwrap());

    let (_, vk3) = setup::<Bn254>(&cs, seed(6)).unwrap();
    assert_ne!(vk1.to_bytes().unwrap(), vk3.to_bytes().unwrap());
    assert_eq!(pk1.verifying_key(), vk1);
}

#[test]
fn test_setup_rejects_too_many_constraints() {
    let cs = cubic::<Fr>();
    let options = SetupOptions {
        max_constraints: Some(2),
    };
    let err = setup_with_options::<Bn254>(&cs, seed(1), &options).unwrap_err();
    assert!(matches!(err, SetupError::TooManyConstraints { count: 3, max: 2 }));

    let options = SetupOptions {
        max_constraints: Some(3),
    };
    assert!(setup_with_options::<Bn254>(&cs, seed(1), &options).is_ok());
}

#[test]
fn test_setup_rejects_unsatisfiable_constant_constraint() {
    let mut cs = ConstraintSystem::<Fr>::new();
    let x = cs.alloc_witness("x").unwrap();
    cs.enforce(x.into(), x.into(), x.into());
    cs.enforce(
        LinearCombination::from_constant(Fr::from(2u64)),
        LinearCombination::from_constant(Fr::from(3u64)),
        LinearCombination::from_constant(Fr::from(7u64)),
    );
    let err = setup::<Bn254>(&cs, seed(1)).unwrap_err();
    assert!(matches!(err, SetupError::UnsatisfiableConstraint { index: 1 }));
}

// ============================================================================
// Mismatches
// ============================================================================

#[test]
fn test_key_mismatch() {
    let f = fixture();
    let other = compile::<Fr, _>(&Shifted).unwrap();
    let (other_pk, other_vk) = setup::<Bn254>(&other, seed(9)).unwrap();

    let witness = cubic_witness(&f.cs, 3, 35);
    let err = prove(&f.cs, &other_pk, &witness, &mut rng()).unwrap_err();
    assert!(matches!(err, ProvingError::KeyMismatch));

    let err = verify(&f.proof, &other_vk, &f.public).unwrap_err();
    assert!(matches!(err, VerificationError::CircuitMismatch));
}

#[test]
fn test_witness_mismatch() {
    let f = fixture();
    let other = compile::<Fr, _>(&Shifted).unwrap();
    let foreign = build_witness(&other, &CubicCircuit::assignment(3u64, 36u64)).unwrap();
    assert_eq!(foreign.len(), f.cs.num_variables());
    let err = prove(&f.cs, &f.pk, &foreign, &mut rng()).unwrap_err();
    assert!(matches!(err, ProvingError::WitnessMismatch));

    let claims = ClaimCircuit::new(["iss"], ["iss"]).unwrap();
    let claims_cs = compile::<Fr, _>(&claims).unwrap();
    let long = build_witness(
        &claims_cs,
        &claims.assignment(Fr::from(1u64), &[Fr::from(2u64)], Fr::from(3u64)).unwrap(),
    )
    .unwrap();
    let err = prove(&f.cs, &f.pk, &long, &mut rng()).unwrap_err();
    assert!(matches!(err, ProvingError::WitnessLength { .. }));
}

#[test]
fn test_public_input_count_checked() {
    let f = fixture();
    let empty = PublicWitness::new(f.public.circuit_digest(), vec![]);
    let err = verify(&f.proof, &f.vk, &empty).unwrap_err();
    assert!(matches!(
        err,
        VerificationError::PublicInputCount {
            expected: 1,
            actual: 0
        }
    ));
}

#[test]
fn test_identity_points_rejected() {
    let f = fixture();
    let mut inner = f.proof.inner().clone();
    inner.a = <Bn254 as ark_ec::pairing::Pairing>::G1Affine::zero();
    let forged = Proof::<Bn254>::from(inner);

    let err = verify(&forged, &f.vk, &f.public).unwrap_err();
    assert!(matches!(err, VerificationError::InvalidPoint("A")));

    let bytes = forged.to_bytes().unwrap();
    let err = Proof::<Bn254>::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, DeserializationError::IdentityPoint("A")));
}

#[test]
fn test_umbrella_error_names_stage() {
    fn run(f: &Fixture) -> Result<bool, proving::Error> {
        let cs = compile::<Fr, _>(&CubicCircuit)?;
        let witness = build_witness(&cs, &CubicCircuit::assignment(3u64, 36u64))?;
        let proof = prove(&cs, &f.pk, &witness, &mut rng())?;
        Ok(verify(&proof, &f.vk, &witness.public())?)
    }
    let err = run(&fixture()).unwrap_err();
    assert_eq!(err.stage, Stage::Witness);
    assert!(err.to_string().starts_with("witness: "));
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_round_trip_compressed_and_uncompressed() {
    let f = fixture();
    for encoding in [PointEncoding::Compressed, PointEncoding::Uncompressed] {
        let pk_bytes = f.pk.to_bytes_with(encoding).unwrap();
        let vk_bytes = f.vk.to_bytes_with(encoding).unwrap();
        let proof_bytes = f.proof.to_bytes_with(encoding).unwrap();
        let public_bytes = f.public.to_bytes_with(encoding).unwrap();

        let pk = ProvingKey::<Bn254>::from_bytes(&pk_bytes).unwrap();
        let vk = VerifyingKey::<Bn254>::from_bytes(&vk_bytes).unwrap();
        let proof = Proof::<Bn254>::from_bytes(&proof_bytes).unwrap();
        let public = PublicWitness::<Fr>::from_bytes(&public_bytes).unwrap();

        assert_eq!(pk, f.pk);
        assert_eq!(vk, f.vk);
        assert_eq!(proof, f.proof);
        assert_eq!(public, f.public);
        assert!(verify(&proof, &vk, &public).unwrap());
    }
}

#[test]
fn test_proof_size_is_fixed() {
    let f = fixture();
    // BN254: 32-byte G1, 64-byte G2 compressed; double that uncompressed
    assert_eq!(f.proof.to_bytes().unwrap().len(), 24 + 128);
    assert_eq!(f.proof.to_bytes_with(PointEncoding::Uncompressed).unwrap().len(), 24 + 256);

    let mut raw = Vec::new();
    f.proof.write_raw_to(&mut raw).unwrap();
    assert_eq!(raw[8], 1);
    assert_eq!(u64::from_le_bytes(raw[16..24].try_into().unwrap()), 256);
}

#[test]
fn test_single_byte_corruption_never_verifies() {
    let f = fixture();
    let bytes = f.proof.to_bytes().unwrap();
    for i in 0..bytes.len() {
        let mut corrupted = bytes.clone();
        corrupted[i] ^= 0x01;
        match Proof::<Bn254>::from_bytes(&corrupted) {
            Err(_) => {}
            Ok(proof) => assert!(
                !matches!(verify(&proof, &f.vk, &f.public), Ok(true)),
                "corruption at byte {i} still verifies"
            ),
        }
    }
}

#[test]
fn test_decode_rejections() {
    let f = fixture();
    let vk_bytes = f.vk.to_bytes().unwrap();

    let err = Proof::<Bn254>::from_bytes(&vk_bytes).unwrap_err();
    assert!(matches!(err, DeserializationError::WrongKind { .. }));

    let err = VerifyingKey::<ark_bls12_381::Bls12_381>::from_bytes(&vk_bytes).unwrap_err();
    assert!(matches!(err, DeserializationError::CurveMismatch { .. }));

    let mut trailing = vk_bytes.clone();
    trailing.push(0);
    let err = VerifyingKey::<Bn254>::from_bytes(&trailing).unwrap_err();
    assert!(matches!(err, DeserializationError::TrailingBytes(1)));

    let err = VerifyingKey::<Bn254>::from_bytes(&vk_bytes[..vk_bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, DeserializationError::Truncated));

    let mut proof_bytes = f.proof.to_bytes().unwrap();
    proof_bytes[16] += 1;
    proof_bytes.push(0);
    let err = Proof::<Bn254>::from_bytes(&proof_bytes).unwrap_err();
    assert!(matches!(
        err,
        DeserializationError::PayloadLength {
            expected: 128,
            actual: 129
        }
    ));
}

/// Overwrites the little-endian u64 length prefix at `at`.
fn set_len_prefix(bytes: &mut [u8], at: usize, len: u64) {
    bytes[at..at + 8].copy_from_slice(&len.to_le_bytes());
}

#[test]
fn test_oversized_length_prefixes_are_rejected() {
    let f = fixture();
    // Header, then the 32-byte circuit digest
    let body = 24 + 32;

    // Public witness: the values prefix opens the body
    let public = f.public.to_bytes().unwrap();
    for len in [u64::MAX, 1 << 56, 1_000_000, 2] {
        let mut corrupted = public.clone();
        set_len_prefix(&mut corrupted, body, len);
        let err = PublicWitness::<Fr>::from_bytes(&corrupted).unwrap_err();
        assert!(matches!(err, DeserializationError::Truncated), "len {len}: {err}");
    }

    // Compressed vk: alpha_g1 (32) and three G2 points (64 each) precede gamma_abc_g1
    let vk = f.vk.to_bytes().unwrap();
    let gamma_abc = body + 32 + 3 * 64;
    assert_eq!(&vk[gamma_abc..gamma_abc + 8], &2u64.to_le_bytes());
    for len in [u64::MAX, 1 << 56, 1_000_000] {
        let mut corrupted = vk.clone();
        set_len_prefix(&mut corrupted, gamma_abc, len);
        let err = VerifyingKey::<Bn254>::from_bytes(&corrupted).unwrap_err();
        assert!(matches!(err, DeserializationError::Truncated), "len {len}: {err}");
    }

    // Compressed pk: the vk, then beta_g1 and delta_g1, then a_query
    let pk = f.pk.to_bytes().unwrap();
    let a_query = gamma_abc + 8 + 2 * 32 + 2 * 32;
    for len in [u64::MAX, 1 << 56] {
        let mut corrupted = pk.clone();
        set_len_prefix(&mut corrupted, a_query, len);
        let err = ProvingKey::<Bn254>::from_bytes(&corrupted).unwrap_err();
        assert!(matches!(err, DeserializationError::Truncated), "len {len}: {err}");
    }

    // A shorter prefix leaves bytes over
    let mut corrupted = vk.clone();
    set_len_prefix(&mut corrupted, gamma_abc, 1);
    assert!(VerifyingKey::<Bn254>::from_bytes(&corrupted).is_err());
}

#[test]
fn test_stream_reads_consecutive_artifacts() {
    let f = fixture();
    let mut stream = Vec::new();
    f.vk.write_to(&mut stream).unwrap();
    f.proof.write_raw_to(&mut stream).unwrap();

    let mut cursor = stream.as_slice();
    assert_eq!(VerifyingKey::<Bn254>::read_from(&mut cursor).unwrap(), f.vk);
    assert_eq!(Proof::<Bn254>::read_from(&mut cursor).unwrap(), f.proof);
    assert!(cursor.is_empty());
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_artifact_files_round_trip() {
    let f = fixture();
    let dir = tempfile::tempdir().unwrap();
    let pk_path = dir.path().join("proving.key");
    let vk_path = dir.path().join("verifying.key");
    let proof_path = dir.path().join("proof.data");
    let public_path = dir.path().join("public.wtns");

    artifacts::save(&pk_path, &f.pk).unwrap();
    artifacts::save_with(&vk_path, &f.vk, PointEncoding::Uncompressed).unwrap();
    artifacts::save(&proof_path, &f.proof).unwrap();
    artifacts::save(&public_path, &f.public).unwrap();

    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["proof.data", "proving.key", "public.wtns", "verifying.key"]);

    let pk: ProvingKey<Bn254> = artifacts::load(&pk_path).unwrap();
    let vk: VerifyingKey<Bn254> = artifacts::load(&vk_path).unwrap();
    let proof: Proof<Bn254> = artifacts::load(&proof_path).unwrap();
    let public: PublicWitness<Fr> = artifacts::load(&public_path).unwrap();
    assert_eq!(pk, f.pk);
    assert!(verify(&proof, &vk, &public).unwrap());
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.key");
    let err = artifacts::load::<VerifyingKey<Bn254>>(&path).unwrap_err();
    match err {
        DeserializationError::Io { path: Some(p), .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}
