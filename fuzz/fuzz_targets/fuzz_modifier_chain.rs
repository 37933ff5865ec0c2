#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modval_core::{ModifiableValue, Modifier, Readable};

#[derive(Arbitrary, Debug)]
enum ChainOp {
    Add { priority: i8, amount: i32, multiply: bool },
    Readd(u8),
    Remove(u8),
    Toggle(u8),
    SetBase(i32),
    Clear,
}

fn build(amount: i32, multiply: bool) -> Modifier<i32> {
    if multiply {
        Modifier::new(format!("*{amount}"), move |x: i32| x.wrapping_mul(amount))
    } else {
        Modifier::new(format!("+{amount}"), move |x: i32| x.wrapping_add(amount))
    }
}

fuzz_target!(|ops: Vec<ChainOp>| {
    let value = ModifiableValue::new(0i32);
    let mut handles: Vec<Modifier<i32>> = Vec::new();

    for op in ops.into_iter().take(256) {
        match op {
            ChainOp::Add { priority, amount, multiply } => {
                let modifier = build(amount, multiply);
                value.modifiers().add_at(i32::from(priority), modifier.clone());
                handles.push(modifier);
            }
            ChainOp::Readd(i) if !handles.is_empty() => {
                let modifier = handles[usize::from(i) % handles.len()].clone();
                value.modifiers().add(modifier);
            }
            ChainOp::Remove(i) if !handles.is_empty() => {
                let modifier = handles[usize::from(i) % handles.len()].clone();
                value.modifiers().remove(&modifier);
            }
            ChainOp::Toggle(i) if !handles.is_empty() => {
                let modifier = &handles[usize::from(i) % handles.len()];
                modifier.set_enabled(!modifier.is_enabled());
            }
            ChainOp::SetBase(v) => value.set_base_value(v),
            ChainOp::Clear => value.modifiers().clear(),
            ChainOp::Readd(_) | ChainOp::Remove(_) | ChainOp::Toggle(_) => {}
        }

        let entries = value.modifiers().entries();
        assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        let folded = entries
            .iter()
            .filter(|(_, m)| m.is_enabled())
            .fold(value.base_value(), |acc, (_, m)| m.modify(acc));
        assert_eq!(value.value(), folded);
    }
});
