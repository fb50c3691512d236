#![no_main]

use libfuzzer_sys::fuzz_target;
use pep8_core::{
    read_u16_be, step_one, write_u16_be, BufferConsole, CoreConfig, CoreState, Decoder,
    NullTraceSink, StepOutcome,
};

const MAX_STEPS: usize = 4_096;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let _ = Decoder::decode(data[0]);

    let (input_len, image) = data.split_at(1);
    let input_len = usize::from(input_len[0]).min(image.len());
    let (input, image) = image.split_at(input_len);

    let mut state = match CoreState::with_image(image) {
        Ok(state) => state,
        Err(_) => return,
    };
    let mut console = BufferConsole::with_input(input);
    let config = CoreConfig {
        continue_on_input_exhaustion: data[0] & 1 == 1,
        tracing_enabled: false,
    };

    for _ in 0..MAX_STEPS {
        match step_one(&mut state, &mut console, &config, &mut NullTraceSink) {
            StepOutcome::Retired => {}
            StepOutcome::Halted(_) => break,
            StepOutcome::Fault { cause } => {
                assert!(!cause.is_internal(), "decoder admitted {cause:?}");
                break;
            }
        }
    }

    let wrapped = read_u16_be(&state.memory, 0xFFFF);
    write_u16_be(&mut state.memory, 0xFFFF, wrapped);
    assert_eq!(read_u16_be(&state.memory, 0xFFFF), wrapped);
});
