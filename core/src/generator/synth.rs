use crate::generator::profile::{
    CanvasSize, ModeProfile, BOX_HEIGHT, BOX_WIDTH, CONFIDENCE, LDIR_MATCH,
};
use crate::generator::spectrum::generate_spectrum;
use crate::model::{BoundingBox, Detection, ParticleType, PolymerType};
use rand::{seq::SliceRandom, Rng};
use std::collections::HashSet;

const ID_PREFIX: &str = "det-";
const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut id = String::with_capacity(ID_PREFIX.len() + ID_LEN);
    id.push_str(ID_PREFIX);
    for _ in 0..ID_LEN {
        id.push(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char);
    }
    id
}

fn random_box<R: Rng + ?Sized>(rng: &mut R, canvas: CanvasSize) -> BoundingBox {
    let width = rng.gen_range(BOX_WIDTH).min(canvas.width);
    let height = rng.gen_range(BOX_HEIGHT).min(canvas.height);
    // gen::<f64>() is in [0, 1), so the far edge never passes the canvas.
    let x = rng.gen::<f64>() * (canvas.width - width);
    let y = rng.gen::<f64>() * (canvas.height - height);
    BoundingBox::new(x, y, width, height)
}

/// Draws one detection whose id is not yet in `taken`, and records the id.
pub fn generate_detection<R: Rng + ?Sized>(
    rng: &mut R,
    canvas: CanvasSize,
    taken: &mut HashSet<String>,
) -> Detection {
    let particle_type = *ParticleType::ALL
        .choose(rng)
        .unwrap_or(&ParticleType::Fragment);
    let polymer_type = *PolymerType::IDENTIFIABLE
        .choose(rng)
        .unwrap_or(&PolymerType::Unknown);
    let bounding_box = random_box(rng, canvas);
    let confidence = rng.gen_range(CONFIDENCE);
    let ldir_match_score = rng.gen_range(LDIR_MATCH);
    let spectrum_data = generate_spectrum(rng);

    let mut id = random_id(rng);
    while !taken.insert(id.clone()) {
        id = random_id(rng);
    }

    Detection {
        id,
        particle_type,
        polymer_type,
        confidence,
        bounding_box,
        ldir_match_score,
        spectrum_data,
    }
}

/// Draws the detection list for one run of the given profile.
pub fn generate_detections<R: Rng + ?Sized>(
    rng: &mut R,
    profile: &ModeProfile,
    canvas: CanvasSize,
) -> Vec<Detection> {
    let count = profile.sample_detection_count(rng);
    let mut taken = HashSet::with_capacity(count);
    (0..count)
        .map(|_| generate_detection(rng, canvas, &mut taken))
        .collect()
}
