use mt19937_predictor::mersenne::{nxt, seed_mt};
use mt19937_predictor::predict::{Predictor, Variant};
use num_bigint::BigUint;
use rand::Rng;

fn main() {
    let mut rng = rand::thread_rng();
    let mut target = seed_mt(rng.gen());

    let mut predictor = Predictor::new(false, Variant::Modern);
    for _ in 0..624 {
        let observed = nxt(&mut target);
        predictor
            .absorb_words(&BigUint::from(observed), 32)
            .expect("32 is a multiple of 32");
    }

    println!("state recovered from 624 observed outputs");
    println!("next five outputs of the target generator:");
    for _ in 0..5 {
        let predicted = predictor
            .predict_getrandbits(32)
            .expect("state fully absorbed");
        let actual = nxt(&mut target);
        println!("  predicted {predicted:>10}  actual {actual:>10}");
    }

    for _ in 0..5 {
        predictor
            .backtrack_getrandbits(32)
            .expect("state fully absorbed");
    }
    let replayed = predictor.predict_random().expect("state fully absorbed");
    println!("re-read as a double, the next draw would be {replayed}");
}
