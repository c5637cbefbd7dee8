use anyhow::Result;

use crate::settings::Settings;

pub async fn execute(settings: &Settings) -> Result<()> {
	let controller = super::watch::controller(settings)?;
	let (observation, verdict) = controller.check_once().await?;

	println!("active booking: {}", observation.active);
	match (&observation.slot, verdict) {
		(Some(slot), Some(verdict)) => {
			let times = slot.candidate_times.joined(", ");
			println!("earliest open:  {} [{}]", slot.date, if times.is_empty() { "no times" } else { times.as_str() });
			match verdict {
				Ok(()) => println!("eligible:       yes"),
				Err(reason) => println!("eligible:       no ({reason})"),
			}
		}
		_ => println!("earliest open:  none"),
	}
	Ok(())
}
