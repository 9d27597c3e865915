pub const OPTED_IN: &str =
    "You have successfully opted in to the calendar service. To opt out use `/stop`";
pub const ALREADY_OPTED_IN: &str = "You have already opted in to the calendar service.";
pub const OPTED_OUT: &str =
    "You have successfully opted out of the calendar service. To opt in again use `/optin`";
pub const NOT_OPTED_IN: &str = "You are not part of the calendar service. Cannot Opt out";

pub fn command_ack(command_name: &str) -> String {
    format!("Executed {}", command_name)
}

pub fn render_delivery_message(guild_name: &str, event_name: &str, user_id: u64, link: &str) -> String {
    format!(
        ":wave: I'm sure **{guild}** are stoked to hear you're coming to **{event}**, <@{user}>!\n\
         :calendar: Download this file to add the event to your calendar! Or add to your google calendar [here](<{link}>)",
        guild = guild_name,
        event = event_name,
        user = user_id,
        link = link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_message_mentions_everything() {
        let body = render_delivery_message("Board Gamers", "Game night", 99, "https://x");
        assert!(body.starts_with(":wave: I'm sure **Board Gamers** are stoked"));
        assert!(body.contains("**Game night**, <@99>!\n:calendar: Download"));
        assert!(body.ends_with("[here](<https://x>)"));
    }
}
