use super::context::TurnContext;

/// One step of the turn advance.
///
/// Object-safe so systems can be stored as `Box<dyn TurnSystem>`. Systems run
/// in registration order, each seeing the state left by the ones before it.
pub trait TurnSystem {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &mut TurnContext);
}
