use vlpim_common::PipelineConfig;

pub fn execute(config: &PipelineConfig) -> anyhow::Result<()> {
    config.validate()?;
    println!("{}", config.to_json()?);
    Ok(())
}
