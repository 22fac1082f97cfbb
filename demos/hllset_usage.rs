use hllset::common::NumStdDev;
use hllset::hllset::HllSet;

fn main() {
    println!("HllSet example\n");

    let mut a = HllSet::new(12).unwrap();
    let mut b = HllSet::new(12).unwrap();
    for i in 0..10_000 {
        a.add(i);
    }
    for i in 5_000..20_000 {
        b.add(i);
    }

    println!("Estimated |A|: {:.2} (actual 10000)", a.count());
    println!("Estimated |B|: {:.2} (actual 15000)", b.count());
    println!(
        "|A| bounds (2 std dev): [{:.2}, {:.2}]",
        a.lower_bound(NumStdDev::Two),
        a.upper_bound(NumStdDev::Two)
    );

    // Set algebra
    let union = a.union(&b).unwrap();
    let intersection = a.intersection(&b).unwrap();
    let only_a = a.complement(&b).unwrap();
    let either = a.symmetric_difference(&b).unwrap();
    println!("\nEstimated |A ∪ B|: {:.2} (actual 20000)", union.count());
    println!("Estimated |A ∩ B|: {:.2} (actual 5000)", intersection.count());
    println!("Estimated |A \\ B|: {:.2} (actual 5000)", only_a.count());
    println!("Estimated |A △ B|: {:.2} (actual 15000)", either.count());

    // Similarity
    println!("\nJaccard(A, B): {:.3} (actual 0.250)", a.jaccard(&b).unwrap());
    println!(
        "P(A | B): {:.3} (actual 0.333)",
        a.conditional_probability(&b).unwrap()
    );

    // Sketches with different seeds summarize the same data independently
    let mut entangled = HllSet::with_seed(12, 42).unwrap();
    entangled.extend(0..10_000);
    println!("\nEstimated |A| with seed 42: {:.2}", entangled.count());
    match a.union(&entangled) {
        Ok(_) => unreachable!("different seeds cannot be combined"),
        Err(err) => println!("Combining across seeds fails: {err}"),
    }

    // Serialize and deserialize
    let bytes = a.serialize();
    println!("\nSerialized size: {} bytes", bytes.len());
    let restored = HllSet::deserialize(&bytes).unwrap();
    println!("Estimate after deserialization: {:.2}", restored.count());

    println!("\nDebug: {:?}", restored);
}
