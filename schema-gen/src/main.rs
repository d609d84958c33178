use schemars::schema_for;
use swh::input::Input;

fn main() {
    let schema = schema_for!(Input);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
