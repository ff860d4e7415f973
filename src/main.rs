fn main() -> anyhow::Result<()> {
    heartwatch_lib::run()
}
