//! Property tests for routing returned messages along the backoff ladder.

use postq_delivery::{
    DelayedBinding, DelayedQueues, MailError, MailMessage, Returned, Route, SendEventResult,
};
use proptest::prelude::*;

fn verdict() -> impl Strategy<Value = SendEventResult> {
    prop_oneof![
        4 => Just(SendEventResult::Delay),
        1 => Just(SendEventResult::Error),
        1 => Just(SendEventResult::Success),
    ]
}

fn message_at(rung: usize) -> MailMessage {
    let mut message = MailMessage::new("sender@example.com", "rcpt@example.org", "");
    for _ in 0..rung {
        message.advance_binding();
    }
    message
}

proptest! {
    #[test]
    fn delay_moves_exactly_one_rung(rung in 0usize..14) {
        let queues = DelayedQueues::new();
        let message = message_at(rung);
        let before = message.binding();

        let route = queues.route(Returned { result: SendEventResult::Delay, message });

        match before.successor() {
            Some(DelayedBinding::NotSend) | None => {
                prop_assert_eq!(route, Route::DeadLetter);
            }
            Some(next) => {
                prop_assert_eq!(route, Route::Delayed(next));
                prop_assert_eq!(queues.len_for(next), 1);
            }
        }
        prop_assert_eq!(queues.len(), 1);
    }

    #[test]
    fn error_never_moves_the_binding(rung in 0usize..14, code in 100i64..600) {
        let queues = DelayedQueues::new();
        let mut message = message_at(rung);
        let before = message.binding();
        message.set_error(Some(MailError::new(format!("{code} failed"), code)));

        let route = queues.route(Returned { result: SendEventResult::Error, message });

        prop_assert_eq!(route, Route::Failed);
        prop_assert_eq!(queues.failed()[0].binding(), before);
    }

    #[test]
    fn bindings_only_climb(verdicts in prop::collection::vec(verdict(), 1..40)) {
        let queues = DelayedQueues::new();
        let mut message = message_at(0);
        let mut highest = u8::from(DelayedBinding::Unknown);

        for result in verdicts {
            match queues.route(Returned { result, message }) {
                Route::Delayed(binding) => {
                    prop_assert_ne!(binding, DelayedBinding::Unknown);
                    prop_assert_ne!(binding, DelayedBinding::NotSend);
                    prop_assert_eq!(u8::from(binding), highest + 1);
                    highest = u8::from(binding);

                    let mut waiting = queues.take_delayed(binding);
                    prop_assert_eq!(waiting.len(), 1);
                    message = waiting.remove(0);
                }
                Route::DeadLetter => {
                    prop_assert_eq!(queues.dead_letters()[0].binding(), DelayedBinding::NotSend);
                    break;
                }
                Route::Failed | Route::Done => break,
            }
        }

        prop_assert!(DelayedBinding::ALL.iter().all(|b| queues.len_for(*b) == 0));
    }
}
