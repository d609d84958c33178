#![no_main]

use libfuzzer_sys::fuzz_target;
use swh::corpus::Corpus;
use swh::input::Input;

fuzz_target!(|input: Input| {
    // keep runs short enough for the fuzzer to get through many inputs
    if input.simulation_time.total_steps() > 10_000 {
        return;
    }
    if let Ok(mut corpus) = Corpus::from_inputs(&input) {
        let _ = corpus.run();
    }
});
